//! Plain-text rendering of a generated product document.
//!
//! The same banner layout is printed to the console after generation and fed
//! to the classifier as the product document.

use super::GeneratedSections;

/// Heavy separator framing the document.
pub const HEAVY_RULE: &str = "====================================================================================================";
/// Light separator between sections.
pub const LIGHT_RULE: &str = "----------------------------------------------------------------------------------------------------";

/// How the title line of a rendered document reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentHeading {
    /// `【产品名称】:<name>`, used for the classification prompt.
    ProductName,
    /// `**处理产品完成:<name>**`, used for the console report.
    Completed,
}

pub fn render_document(sections: &GeneratedSections, heading: DocumentHeading) -> String {
    let title = match heading {
        DocumentHeading::ProductName => format!("【产品名称】:{}", sections.modified_name),
        DocumentHeading::Completed => format!("**处理产品完成:{}**", sections.modified_name),
    };

    let cost = format!("【成本】:{}", sections.cost_estimate);

    let lines: [&str; 14] = [
        HEAVY_RULE,
        &title,
        HEAVY_RULE,
        "【硬性设计】",
        &sections.hard_design,
        LIGHT_RULE,
        &cost,
        LIGHT_RULE,
        "【核心功能】",
        &sections.core_features,
        LIGHT_RULE,
        "【价值定位】",
        &sections.value_proposition,
        HEAVY_RULE,
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> GeneratedSections {
        GeneratedSections {
            modified_name: "台灯".to_string(),
            hard_design: "X".to_string(),
            cost_estimate: "¥50".to_string(),
            core_features: "Y".to_string(),
            value_proposition: "Z".to_string(),
        }
    }

    #[test]
    fn test_rules_are_100_wide() {
        assert_eq!(HEAVY_RULE.chars().count(), 100);
        assert_eq!(LIGHT_RULE.chars().count(), 100);
        assert!(HEAVY_RULE.chars().all(|c| c == '='));
        assert!(LIGHT_RULE.chars().all(|c| c == '-'));
    }

    #[test]
    fn test_render_product_document() {
        let doc = render_document(&sections(), DocumentHeading::ProductName);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], HEAVY_RULE);
        assert_eq!(lines[1], "【产品名称】:台灯");
        assert_eq!(lines[3], "【硬性设计】");
        assert_eq!(lines[4], "X");
        assert_eq!(lines[6], "【成本】:¥50");
        assert_eq!(lines[9], "Y");
        assert_eq!(lines[12], "Z");
        assert_eq!(lines.last(), Some(&HEAVY_RULE));
        assert!(!doc.ends_with('\n'));
    }

    #[test]
    fn test_render_completed_heading() {
        let doc = render_document(&sections(), DocumentHeading::Completed);
        assert!(doc.contains("**处理产品完成:台灯**"));
    }
}
