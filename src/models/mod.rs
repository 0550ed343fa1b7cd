//! Data models for product rows, generated documents and the taxonomy.

mod category;
mod document;
mod product;

pub use category::{load_taxonomy, Category, CategoryLabel, PARSE_FAILED, TAXONOMY_COLUMNS};
pub use document::{render_document, DocumentHeading, HEAVY_RULE, LIGHT_RULE};
pub use product::{
    EnrichedRow, GeneratedSections, ProductRow, Section, GENERATED_COLUMNS, NOT_GENERATED,
    PRODUCT_COLUMNS,
};
