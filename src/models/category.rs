//! Category taxonomy and classification labels.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::storage::{StorageError, Table};

/// Label written when the model's answer could not be interpreted.
pub const PARSE_FAILED: &str = "解析失败";

/// Columns every taxonomy file must provide.
pub const TAXONOMY_COLUMNS: [&str; 3] = ["index", "explanation", "name"];

/// One entry of the category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Ordinal identifier.
    pub index: String,
    /// Description shown to the model only.
    pub explanation: String,
    /// Canonical label used in output.
    pub name: String,
}

impl Category {
    pub fn new(
        index: impl Into<String>,
        explanation: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            explanation: explanation.into(),
            name: name.into(),
        }
    }
}

/// Load the taxonomy from a CSV file with `index`, `explanation`, `name` columns.
pub fn load_taxonomy(path: &Path) -> Result<Vec<Category>, StorageError> {
    let table = Table::read(path)?;
    table.require_columns(&TAXONOMY_COLUMNS)?;

    let categories: Vec<Category> = table
        .records()
        .iter()
        .map(|r| {
            Category::new(
                r.get_or_empty("index"),
                r.get_or_empty("explanation"),
                r.get_or_empty("name"),
            )
        })
        .collect();

    info!(
        "Loaded {} categories from {}",
        categories.len(),
        path.display()
    );
    Ok(categories)
}

/// Outcome of classifying one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLabel {
    /// Name returned by the model, copied verbatim.
    Named(String),
    /// The answer was not the expected JSON object.
    ParseFailed,
}

impl CategoryLabel {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryLabel::Named(name) => name,
            CategoryLabel::ParseFailed => PARSE_FAILED,
        }
    }

    pub fn is_parse_failed(&self) -> bool {
        matches!(self, CategoryLabel::ParseFailed)
    }

    /// Whether the label names one of `categories`.
    pub fn is_member_of(&self, categories: &[Category]) -> bool {
        match self {
            CategoryLabel::Named(name) => categories.iter().any(|c| &c.name == name),
            CategoryLabel::ParseFailed => false,
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.csv");
        std::fs::write(
            &path,
            "index,explanation,name\n1,台灯、吊灯等照明设备,Lighting\n2,\"桌椅, 柜子\",Furniture\n",
        )
        .unwrap();

        let categories = load_taxonomy(&path).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0], Category::new("1", "台灯、吊灯等照明设备", "Lighting"));
        assert_eq!(categories[1].explanation, "桌椅, 柜子");
    }

    #[test]
    fn test_load_taxonomy_requires_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.csv");
        std::fs::write(&path, "index,name\n1,Lighting\n").unwrap();

        let err = load_taxonomy(&path).unwrap_err();
        assert!(err.to_string().contains("explanation"));
    }

    #[test]
    fn test_label_membership() {
        let categories = vec![Category::new("1", "lamps", "Lighting")];
        assert!(CategoryLabel::Named("Lighting".to_string()).is_member_of(&categories));
        assert!(!CategoryLabel::Named("Toys".to_string()).is_member_of(&categories));
        assert!(!CategoryLabel::ParseFailed.is_member_of(&categories));
        assert_eq!(CategoryLabel::ParseFailed.to_string(), PARSE_FAILED);
    }
}
