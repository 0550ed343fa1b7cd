//! Document generation stage.
//!
//! Every product row becomes one streaming reasoning request. The answer is
//! split into five tagged sections which are appended to the row. Rows are
//! never dropped: a failed request yields a row of sentinels.

mod prompts;
mod sections;

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::llm::{ChatModel, LlmError, ReasoningEcho};
use crate::models::{
    render_document, DocumentHeading, EnrichedRow, GeneratedSections, ProductRow,
    GENERATED_COLUMNS, PRODUCT_COLUMNS,
};
use crate::pipeline::{ErrorPolicy, PipelineError, StageReport};
use crate::storage::Table;

pub use prompts::{generation_user_prompt, GENERATION_SYSTEM_PROMPT};
pub use sections::parse_sections;

const STAGE: &str = "generate";

/// Generates product design documents with a reasoning model.
pub struct DocumentGenerator {
    model: Arc<dyn ChatModel>,
    concurrency: usize,
    error_policy: ErrorPolicy,
    echo: ReasoningEcho,
    quiet: bool,
}

/// Result of one row's request before it is merged back into the table.
struct RowOutcome {
    sections: GeneratedSections,
    error: Option<LlmError>,
}

impl DocumentGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            concurrency: crate::config::DEFAULT_CONCURRENCY,
            error_policy: ErrorPolicy::default(),
            echo: ReasoningEcho::Off,
            quiet: false,
        }
    }

    /// Maximum in-flight requests; 0 dispatches every row at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_reasoning_echo(mut self, echo: ReasoningEcho) -> Self {
        self.echo = echo;
        self
    }

    /// Suppress the progress bar and per-row document banners.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Generate the document for a single product.
    ///
    /// A failed model call is logged and treated as an empty answer, so every
    /// section falls back to its sentinel.
    pub async fn generate(&self, row: ProductRow) -> EnrichedRow {
        let outcome = self.request(&row).await;
        EnrichedRow {
            product: row,
            sections: outcome.sections,
        }
    }

    async fn request(&self, row: &ProductRow) -> RowOutcome {
        let user_prompt = generation_user_prompt(row);
        match self
            .model
            .reason(GENERATION_SYSTEM_PROMPT, &user_prompt, self.echo)
            .await
        {
            Ok(answer) => RowOutcome {
                sections: parse_sections(&answer),
                error: None,
            },
            Err(e) => {
                warn!("Error calling LLM for product {}: {}", row.product_name, e);
                RowOutcome {
                    sections: parse_sections(""),
                    error: Some(e),
                }
            }
        }
    }

    /// Generate documents for every row of `input`.
    ///
    /// The returned table has the input header plus the generated columns (each
    /// added once) and one row per input row, in input order.
    pub async fn run(&self, input: Table) -> Result<(Table, StageReport), PipelineError> {
        input.require_columns(&PRODUCT_COLUMNS)?;

        let total = input.len();
        let pb = self.progress_bar(total);
        let concurrency = self.effective_concurrency();
        let semaphore = (concurrency > 0).then(|| Semaphore::new(concurrency));
        info!(
            "Generating documents for {} products (concurrency: {})",
            total,
            if concurrency == 0 {
                "unbounded".to_string()
            } else {
                concurrency.to_string()
            }
        );

        let mut output = Table::new(input.headers().to_vec());
        for column in GENERATED_COLUMNS {
            output.ensure_column(column);
        }

        let products: Vec<ProductRow> =
            input.records().iter().map(ProductRow::from_record).collect();

        let tasks = products.iter().map(|product| {
            let semaphore = semaphore.as_ref();
            let pb = &pb;
            async move {
                let _permit = match semaphore {
                    Some(s) => s.acquire().await.ok(),
                    None => None,
                };
                self.announce(pb, &format!("开始处理产品{}", product.product_name));
                let outcome = self.request(product).await;
                self.announce(
                    pb,
                    &render_document(&outcome.sections, DocumentHeading::Completed),
                );
                pb.inc(1);
                outcome
            }
        });
        let outcomes = join_all(tasks).await;
        pb.finish_and_clear();

        let mut report = StageReport::new(STAGE);
        let rows = input.into_records().into_iter().zip(outcomes).zip(&products);
        for (index, ((mut record, outcome), product)) in rows.enumerate() {
            match outcome.error {
                Some(error) if self.error_policy == ErrorPolicy::Abort => {
                    return Err(PipelineError::Aborted {
                        stage: STAGE,
                        row: index,
                        label: product.product_name.clone(),
                        source: error,
                    });
                }
                Some(error) => report.record_failure(index, &product.product_name, &error),
                None if outcome.sections.generated_count() < GENERATED_COLUMNS.len() => {
                    report.degraded += 1;
                }
                None => {}
            }
            outcome.sections.apply_to(&mut record);
            output.push(record);
        }
        report.rows = output.len();

        Ok((output, report))
    }

    /// Read `input`, generate every row, write `output`.
    ///
    /// Output is written only once the whole batch has finished.
    pub async fn run_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<StageReport, PipelineError> {
        let table = Table::read(input)?;
        let (table, report) = self.run(table).await?;
        table.write(output)?;
        info!("Wrote {} enriched rows to {}", report.rows, output.display());
        Ok(report)
    }

    /// Echoed reasoning streams straight to stderr, so rows run one at a time
    /// to keep each row's text contiguous.
    fn effective_concurrency(&self) -> usize {
        match self.echo {
            ReasoningEcho::Stderr => 1,
            ReasoningEcho::Off => self.concurrency,
        }
    }

    /// Print operator-facing text above the progress bar.
    fn announce(&self, pb: &ProgressBar, text: &str) {
        if !self.quiet {
            pb.suspend(|| println!("{}", text));
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        // The bar would redraw through the echoed reasoning
        if self.quiet || self.echo == ReasoningEcho::Stderr {
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
