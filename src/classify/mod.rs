//! Category classification stage.
//!
//! Each enriched row is rendered back into a product document and sent, with
//! the full taxonomy, to a single-shot model call that answers with
//! `{"category": "<name>"}`. Rows are processed one at a time.

mod prompts;

use std::path::Path;
use std::sync::Arc;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::llm::{ChatModel, LlmError};
use crate::models::{
    render_document, Category, CategoryLabel, DocumentHeading, GeneratedSections,
};
use crate::pipeline::{ErrorPolicy, PipelineError, StageReport};
use crate::storage::{Record, Table};

pub use prompts::{categories_xml, classification_user_prompt, CLASSIFICATION_SYSTEM_PROMPT};

const STAGE: &str = "classify";

/// Column added to every classified row.
pub const CATEGORY_COLUMN: &str = "category";

#[derive(Debug, Deserialize)]
struct CategoryAnswer {
    category: String,
}

/// Interpret a classification answer.
///
/// Anything other than a JSON object with a string `category` key, including
/// an object that lacks the key, is a parse failure.
pub fn parse_label(answer: &str) -> CategoryLabel {
    match serde_json::from_str::<CategoryAnswer>(answer.trim()) {
        Ok(parsed) => CategoryLabel::Named(parsed.category),
        Err(e) => {
            debug!("Unparseable classification answer ({}): {}", e, answer);
            CategoryLabel::ParseFailed
        }
    }
}

/// Build the product document the classifier sees for an enriched row.
pub fn compose_document(record: &Record) -> String {
    let sections = GeneratedSections::from_record(record);
    render_document(&sections, DocumentHeading::ProductName)
}

/// Classify one document against `categories`.
pub async fn classify(
    model: &dyn ChatModel,
    document: &str,
    categories: &[Category],
) -> Result<CategoryLabel, LlmError> {
    let xml = categories_xml(categories);
    classify_with(model, document, &xml).await
}

async fn classify_with(
    model: &dyn ChatModel,
    document: &str,
    categories_xml: &str,
) -> Result<CategoryLabel, LlmError> {
    let user_prompt = classification_user_prompt(document, categories_xml);
    debug!("Classification prompt:\n{}", user_prompt);
    let answer = model
        .complete(CLASSIFICATION_SYSTEM_PROMPT, &user_prompt)
        .await?;
    Ok(parse_label(&answer))
}

/// Assigns taxonomy categories to enriched product rows.
pub struct CategoryClassifier {
    model: Arc<dyn ChatModel>,
    categories: Vec<Category>,
    categories_xml: String,
    error_policy: ErrorPolicy,
    strict_taxonomy: bool,
    quiet: bool,
}

impl CategoryClassifier {
    pub fn new(model: Arc<dyn ChatModel>, categories: Vec<Category>) -> Self {
        let categories_xml = categories_xml(&categories);
        Self {
            model,
            categories,
            categories_xml,
            error_policy: ErrorPolicy::default(),
            strict_taxonomy: false,
            quiet: false,
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Reject names that are not part of the taxonomy.
    pub fn with_strict_taxonomy(mut self, strict: bool) -> Self {
        self.strict_taxonomy = strict;
        self
    }

    /// Suppress the progress bar and per-row document banners.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Classify one product document.
    pub async fn classify(&self, document: &str) -> Result<CategoryLabel, LlmError> {
        let label = classify_with(self.model.as_ref(), document, &self.categories_xml).await?;
        if self.strict_taxonomy && !label.is_parse_failed() && !label.is_member_of(&self.categories)
        {
            warn!("Model answered unknown category '{}'", label);
            return Ok(CategoryLabel::ParseFailed);
        }
        Ok(label)
    }

    /// Classify every row of `input`, strictly in order.
    ///
    /// The returned table has the input header plus `category` (added only if
    /// absent). Nothing is returned until every row has been processed.
    pub async fn run(&self, input: Table) -> Result<(Table, StageReport), PipelineError> {
        let mut output = Table::new(input.headers().to_vec());
        output.ensure_column(CATEGORY_COLUMN);

        let pb = self.progress_bar(input.len());
        let mut report = StageReport::new(STAGE);
        info!(
            "Classifying {} documents against {} categories",
            input.len(),
            self.categories.len()
        );

        for (index, mut record) in input.into_records().into_iter().enumerate() {
            let label_text = row_label(&record);
            pb.set_message(label_text.clone());

            let document = compose_document(&record);
            if !self.quiet {
                pb.suspend(|| println!("{}", document));
            }

            let label = match self.classify(&document).await {
                Ok(label) => {
                    if label.is_parse_failed() {
                        report.degraded += 1;
                    }
                    label
                }
                Err(error) if self.error_policy == ErrorPolicy::Abort => {
                    pb.finish_and_clear();
                    return Err(PipelineError::Aborted {
                        stage: STAGE,
                        row: index,
                        label: label_text,
                        source: error,
                    });
                }
                Err(error) => {
                    warn!("Error classifying {}: {}", label_text, error);
                    report.record_failure(index, &label_text, &error);
                    CategoryLabel::ParseFailed
                }
            };

            if !self.quiet {
                pb.suspend(|| {
                    println!("{} {} → {}", status_icon(&label), label_text, label);
                });
            }
            record.set(CATEGORY_COLUMN, label.as_str());
            output.push(record);
            pb.inc(1);
        }
        pb.finish_and_clear();
        report.rows = output.len();

        Ok((output, report))
    }

    /// Read `input`, classify every row, write `output`.
    pub async fn run_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<StageReport, PipelineError> {
        let table = Table::read(input)?;
        let (table, report) = self.run(table).await?;
        table.write(output)?;
        info!("Wrote {} classified rows to {}", report.rows, output.display());
        Ok(report)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Per-row console marker: a cross for rows that ended on the parse-failed label.
fn status_icon(label: &CategoryLabel) -> StyledObject<&'static str> {
    if label.is_parse_failed() {
        style("✗").red()
    } else {
        style("✓").green()
    }
}

/// Identifier used for a row in logs and failure reports.
fn row_label(record: &Record) -> String {
    ["modified_name", "product_name"]
        .iter()
        .filter_map(|c| record.get(c))
        .find(|v| !v.trim().is_empty())
        .unwrap_or("<unnamed>")
        .to_string()
}
