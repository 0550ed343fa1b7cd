//! Shared batch-stage types: error policy, per-row failures, stage reports.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmError;
use crate::storage::StorageError;

/// What a stage does when a row's model call fails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Substitute the sentinel, record the failure, keep going.
    #[default]
    Continue,
    /// Stop the stage at the first failure; nothing is written.
    Abort,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("{stage} aborted at row {row} ({label}): {source}")]
    Aborted {
        stage: &'static str,
        row: usize,
        label: String,
        #[source]
        source: LlmError,
    },
}

/// A row whose model call failed and was downgraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based position in the input file.
    pub row: usize,
    /// Human-readable row identifier (product name).
    pub label: String,
    pub error: String,
}

/// Outcome of one batch stage.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    pub stage: &'static str,
    /// Rows written to output.
    pub rows: usize,
    /// Rows that fell back to a sentinel because the answer was malformed.
    pub degraded: usize,
    /// Rows whose model call failed outright.
    pub failures: Vec<RowFailure>,
}

impl StageReport {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    pub fn record_failure(&mut self, row: usize, label: &str, error: &LlmError) {
        self.failures.push(RowFailure {
            row,
            label: label.to_string(),
            error: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.degraded == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ErrorPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"abort\"").unwrap();
        assert_eq!(w.policy, ErrorPolicy::Abort);
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Continue);
    }

    #[test]
    fn test_report_records_failures() {
        let mut report = StageReport::new("classify");
        assert!(report.is_clean());
        report.record_failure(3, "Desk Lamp", &LlmError::Connection("refused".to_string()));
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].row, 3);
        assert!(report.failures[0].error.contains("refused"));
    }
}
