//! Prompts for product document generation.

use crate::models::ProductRow;

/// System instruction for the generation model.
pub const GENERATION_SYSTEM_PROMPT: &str =
    "你是一个产品设计专家，负责根据提供的产品信息生成详细的产品设计文档。你必须使用中文输出。";

/// Build the per-product user prompt.
///
/// The `<output_format>` block asks for five tagged sections; the
/// `<constraints>` block keeps price figures out of every section except the
/// cost estimate.
pub fn generation_user_prompt(row: &ProductRow) -> String {
    format!(
        r#"
<task>
请根据product_info中的产品信息，发挥想象，补充出产品的完整信息，并撰写一个产品设计文档。
</task>
<constraints>
1. 除成本估计部分外的任何其他部分不能出现与产品价格相关的任何数字，如成本、售价等！
</constraints>

<output_format>
输出文档必须包括以下四个部分，且每个部分用XML标签包裹。不要添加任何无关内容。
<modified_name>调整后的商品名。如果该产品的原名能准确概况产品信息，可以直接用于销售，直接翻译成中文即可。否则你需要重写一个商品名作为该产品销售时的名称。</modified_name>
<hard_design>
  硬性设计部分：包括技术指标、设计细节、材料规格、尺寸等具体设计元素。请基于现有信息推断并补充详细的设计参数。
  格式：一段markdown风格的文本，不要用```markdown```或``````包括，格式工整规范。
</hard_design>

<cost_estimate>
  成本估计部分：估计产品的生产成本、材料成本、劳动力成本等，并提供简要的估算依据。
  格式：总成本数字￥
  注意添加￥符号，且无任何其他内容
</cost_estimate>

<core_features>
  核心功能介绍：描述产品的主要功能、优势、如何使用以及解决的用户痛点。
  格式：一段markdown风格的文本，不要用```markdown```或``````包括，格式工整规范。
</core_features>

<value_proposition>
  价值定位部分：说明产品的市场定位、目标用户群、竞争优势和独特卖点。
  格式：一段markdown风格的文本，不要用```markdown```或``````包括，格式工整规范。
</value_proposition>
</output_format>
<product_info>
  <product_name>{product_name}</product_name>
  <product_category_tree>{product_category_tree}</product_category_tree>
  <retail_price>{retail_price}</retail_price>
  <description>{description}</description>
  <product_specifications>{product_specifications}</product_specifications>
</product_info>

"#,
        product_name = row.product_name,
        product_category_tree = row.product_category_tree,
        retail_price = row.retail_price,
        description = row.description,
        product_specifications = row.product_specifications,
    )
}
