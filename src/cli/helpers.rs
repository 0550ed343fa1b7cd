//! Shared helper functions for CLI commands.

use std::sync::Arc;

use anyhow::Context;
use console::style;

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::pipeline::{ErrorPolicy, StageReport};

/// `--fail-fast` wins over whatever the config file says.
pub fn apply_fail_fast(settings: &mut Settings, fail_fast: bool) {
    if fail_fast {
        settings.pipeline.error_policy = ErrorPolicy::Abort;
    }
}

/// Build the shared model client for a command.
pub fn build_client(settings: &Settings) -> anyhow::Result<Arc<LlmClient>> {
    let client = LlmClient::new(settings.llm.clone()).context("Failed to create LLM client")?;
    Ok(Arc::new(client))
}

/// Print the end-of-stage summary to stderr.
pub fn print_report(report: &StageReport) {
    let icon = if report.failures.is_empty() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    eprintln!(
        "{} {}: {} rows written, {} degraded, {} failed",
        icon,
        report.stage,
        report.rows,
        report.degraded,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!(
            "  {} row {} ({}): {}",
            style("→").dim(),
            failure.row,
            failure.label,
            failure.error
        );
    }
}
