//! Extraction of tagged sections from a generation answer.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{GeneratedSections, Section, NOT_GENERATED};

/// `<tag>...</tag>` matchers, `.` spanning newlines, lazy body.
static SECTION_PATTERNS: LazyLock<Vec<(Section, Regex)>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .map(|section| {
            let tag = section.tag();
            let pattern = format!(r"(?s)<{tag}>(.*?)</{tag}>");
            (*section, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Parse all five sections out of a model answer.
///
/// Each section takes the trimmed body of the first `<tag>...</tag>` pair in
/// the text; a section without a closed pair becomes [`NOT_GENERATED`].
pub fn parse_sections(response: &str) -> GeneratedSections {
    let mut sections = GeneratedSections::not_generated();
    for (section, pattern) in SECTION_PATTERNS.iter() {
        let value = pattern
            .captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| NOT_GENERATED.to_string());
        sections.set(*section, value);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sections_present() {
        let response = "<modified_name>台灯</modified_name><hard_design>X</hard_design>\
                        <cost_estimate>¥50</cost_estimate><core_features>Y</core_features>\
                        <value_proposition>Z</value_proposition>";
        let sections = parse_sections(response);
        assert_eq!(sections.modified_name, "台灯");
        assert_eq!(sections.hard_design, "X");
        assert_eq!(sections.cost_estimate, "¥50");
        assert_eq!(sections.core_features, "Y");
        assert_eq!(sections.value_proposition, "Z");
    }

    #[test]
    fn test_multiline_bodies_are_trimmed() {
        let response = "intro\n<hard_design>\n  ## 材料\n- 铝合金\n\n</hard_design>\ntrailer";
        let sections = parse_sections(response);
        assert_eq!(sections.hard_design, "## 材料\n- 铝合金");
    }

    #[test]
    fn test_missing_sections_use_sentinel() {
        let sections = parse_sections("<modified_name>Lamp</modified_name>");
        assert_eq!(sections.modified_name, "Lamp");
        assert_eq!(sections.hard_design, NOT_GENERATED);
        assert_eq!(sections.cost_estimate, NOT_GENERATED);
        assert_eq!(sections.core_features, NOT_GENERATED);
        assert_eq!(sections.value_proposition, NOT_GENERATED);
    }

    #[test]
    fn test_empty_response_is_all_sentinels() {
        assert_eq!(parse_sections(""), GeneratedSections::not_generated());
    }

    #[test]
    fn test_first_match_wins() {
        let response = "<cost_estimate>¥10</cost_estimate> later <cost_estimate>¥99</cost_estimate>";
        assert_eq!(parse_sections(response).cost_estimate, "¥10");
    }

    #[test]
    fn test_truncated_section_is_not_generated() {
        // Stream cut off before the closing tag
        let response = "<core_features>half written";
        assert_eq!(parse_sections(response).core_features, NOT_GENERATED);
    }

    #[test]
    fn test_empty_body_is_empty_string() {
        let response = "<modified_name>  </modified_name>";
        assert_eq!(parse_sections(response).modified_name, "");
    }
}
