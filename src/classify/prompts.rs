//! Prompts for product classification.

use crate::models::Category;

/// System instruction for the classification model.
pub const CLASSIFICATION_SYSTEM_PROMPT: &str = "你是一个商品分类助手。";

/// Render the taxonomy as the `<categories>` block embedded in every prompt.
pub fn categories_xml(categories: &[Category]) -> String {
    let mut xml = String::from("<categories>\n");
    for category in categories {
        xml.push_str(&format!(
            "  <category>\n    <index>{}</index>\n    <explanation>{}</explanation>\n    <name>{}</name>\n  </category>\n",
            category.index, category.explanation, category.name
        ));
    }
    xml.push_str("</categories>");
    xml
}

/// Build the classification user prompt for one product document.
pub fn classification_user_prompt(document: &str, categories_xml: &str) -> String {
    let prompt = format!(
        r#"
<task>
1. 阅读商品类别列表和读取产品设计文档
2. 理解当前产品的属性，在商品类别列表中找到最符合的一类
3. 按要求输出
</task>
{categories_xml}
<product_document>
{document}
</product_document>
<output_format>
输出必须是JSON格式，只包含一个键"category"，值为最匹配的类别的名称（直接使用XML中的name字段值）
不要使用```json```或``````包裹
</output_format>
"#
    );
    prompt.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_xml_layout() {
        let xml = categories_xml(&[
            Category::new("1", "照明设备", "Lighting"),
            Category::new("2", "家具", "Furniture"),
        ]);
        let expected = "<categories>\n  <category>\n    <index>1</index>\n    <explanation>照明设备</explanation>\n    <name>Lighting</name>\n  </category>\n  <category>\n    <index>2</index>\n    <explanation>家具</explanation>\n    <name>Furniture</name>\n  </category>\n</categories>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_empty_taxonomy() {
        assert_eq!(categories_xml(&[]), "<categories>\n</categories>");
    }

    #[test]
    fn test_user_prompt_is_trimmed_and_complete() {
        let prompt = classification_user_prompt("DOC", "<categories>\n</categories>");
        assert!(prompt.starts_with("<task>"));
        assert!(prompt.ends_with("</output_format>"));
        assert!(prompt.contains("<product_document>\nDOC\n</product_document>"));
        assert!(prompt.contains("\"category\""));
    }
}
