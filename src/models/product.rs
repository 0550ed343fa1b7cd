//! Product rows and the sections generated for them.

use crate::storage::Record;

/// Placeholder for a section the model did not produce.
pub const NOT_GENERATED: &str = "Not generated";

/// Columns every product input file must provide.
pub const PRODUCT_COLUMNS: [&str; 5] = [
    "product_name",
    "product_category_tree",
    "retail_price",
    "description",
    "product_specifications",
];

/// Columns added by the document generator, in output order.
pub const GENERATED_COLUMNS: [&str; 5] = [
    "modified_name",
    "hard_design",
    "cost_estimate",
    "core_features",
    "value_proposition",
];

/// One tagged section of a generated product document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Short sales title.
    ModifiedName,
    /// Technical specification, materials, dimensions (markdown).
    HardDesign,
    /// Bare monetary amount with a currency symbol.
    CostEstimate,
    /// Functions, usage and pain points addressed (markdown).
    CoreFeatures,
    /// Market positioning and selling points (markdown).
    ValueProposition,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::ModifiedName,
        Section::HardDesign,
        Section::CostEstimate,
        Section::CoreFeatures,
        Section::ValueProposition,
    ];

    /// Markup tag name, which is also the output column name.
    pub fn tag(self) -> &'static str {
        match self {
            Section::ModifiedName => "modified_name",
            Section::HardDesign => "hard_design",
            Section::CostEstimate => "cost_estimate",
            Section::CoreFeatures => "core_features",
            Section::ValueProposition => "value_proposition",
        }
    }
}

/// A raw product record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRow {
    pub product_name: String,
    pub product_category_tree: String,
    pub retail_price: String,
    pub description: String,
    pub product_specifications: String,
}

impl ProductRow {
    /// Extract the product fields from a table row.
    ///
    /// The table header is validated against [`PRODUCT_COLUMNS`] before rows
    /// are read, so absent values here only come from short rows.
    pub fn from_record(record: &Record) -> Self {
        Self {
            product_name: record.get_or_empty("product_name").to_string(),
            product_category_tree: record.get_or_empty("product_category_tree").to_string(),
            retail_price: record.get_or_empty("retail_price").to_string(),
            description: record.get_or_empty("description").to_string(),
            product_specifications: record.get_or_empty("product_specifications").to_string(),
        }
    }
}

/// The five sections generated for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSections {
    pub modified_name: String,
    pub hard_design: String,
    pub cost_estimate: String,
    pub core_features: String,
    pub value_proposition: String,
}

impl GeneratedSections {
    /// Every section set to [`NOT_GENERATED`].
    pub fn not_generated() -> Self {
        Self {
            modified_name: NOT_GENERATED.to_string(),
            hard_design: NOT_GENERATED.to_string(),
            cost_estimate: NOT_GENERATED.to_string(),
            core_features: NOT_GENERATED.to_string(),
            value_proposition: NOT_GENERATED.to_string(),
        }
    }

    /// Read previously generated sections back from an enriched row.
    /// Missing columns read as empty text.
    pub fn from_record(record: &Record) -> Self {
        let mut sections = Self::not_generated();
        for section in Section::ALL {
            sections.set(section, record.get_or_empty(section.tag()).to_string());
        }
        sections
    }

    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::ModifiedName => &self.modified_name,
            Section::HardDesign => &self.hard_design,
            Section::CostEstimate => &self.cost_estimate,
            Section::CoreFeatures => &self.core_features,
            Section::ValueProposition => &self.value_proposition,
        }
    }

    pub fn set(&mut self, section: Section, value: String) {
        let slot = match section {
            Section::ModifiedName => &mut self.modified_name,
            Section::HardDesign => &mut self.hard_design,
            Section::CostEstimate => &mut self.cost_estimate,
            Section::CoreFeatures => &mut self.core_features,
            Section::ValueProposition => &mut self.value_proposition,
        };
        *slot = value;
    }

    /// Number of sections the model actually produced.
    pub fn generated_count(&self) -> usize {
        Section::ALL
            .iter()
            .filter(|s| self.get(**s) != NOT_GENERATED)
            .count()
    }

    /// Write the sections into a table row under their column names.
    pub fn apply_to(&self, record: &mut Record) {
        for section in Section::ALL {
            record.set(section.tag(), self.get(section));
        }
    }
}

/// A product row together with its generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRow {
    pub product: ProductRow,
    pub sections: GeneratedSections,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_generated_columns() {
        let tags: Vec<&str> = Section::ALL.iter().map(|s| s.tag()).collect();
        assert_eq!(tags, GENERATED_COLUMNS);
    }

    #[test]
    fn test_apply_and_read_back() {
        let mut sections = GeneratedSections::not_generated();
        sections.set(Section::CostEstimate, "¥50".to_string());
        assert_eq!(sections.generated_count(), 1);

        let mut record = Record::new().with("product_name", "Desk Lamp");
        sections.apply_to(&mut record);
        assert_eq!(record.get("cost_estimate"), Some("¥50"));
        assert_eq!(record.get("hard_design"), Some(NOT_GENERATED));
        assert_eq!(record.get("product_name"), Some("Desk Lamp"));

        assert_eq!(GeneratedSections::from_record(&record), sections);
    }

    #[test]
    fn test_from_record_missing_columns_are_empty() {
        let record = Record::new().with("modified_name", "台灯");
        let sections = GeneratedSections::from_record(&record);
        assert_eq!(sections.modified_name, "台灯");
        assert_eq!(sections.hard_design, "");
    }
}
