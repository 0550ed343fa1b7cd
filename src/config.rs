//! Configuration for catalog-forge.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual values. Command-line flags are applied last by the
//! CLI layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::llm::LlmConfig;
use crate::pipeline::ErrorPolicy;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "catalog-forge.toml";

/// Default number of in-flight generation requests.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Batch behaviour shared by both stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum concurrent generation requests (0 = one task per row, unbounded)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// What to do when a row's model call fails
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Replace category names outside the taxonomy with the parse-failed label
    #[serde(default)]
    pub strict_taxonomy: bool,
    /// Echo streamed reasoning to stderr while generating
    #[serde(default)]
    pub show_reasoning: bool,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            error_policy: ErrorPolicy::default(),
            strict_taxonomy: false,
            show_reasoning: false,
        }
    }
}

impl PipelineConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `PIPELINE_CONCURRENCY`: maximum in-flight generation requests
    /// - `PIPELINE_ERROR_POLICY`: "continue" or "abort"
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("PIPELINE_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                self.concurrency = n;
            }
        }
        if let Ok(val) = std::env::var("PIPELINE_ERROR_POLICY") {
            match val.to_lowercase().as_str() {
                "continue" => self.error_policy = ErrorPolicy::Continue,
                "abort" => self.error_policy = ErrorPolicy::Abort,
                _ => {}
            }
        }
        self
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Parse settings from TOML text (no env overrides).
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(self) -> Self {
        Self {
            llm: self.llm.with_env_overrides(),
            pipeline: self.pipeline.with_env_overrides(),
        }
    }
}

/// Load settings from `path` (or [`DEFAULT_CONFIG_FILE`] if it exists), then
/// apply environment overrides.
///
/// An explicitly given path must exist; the default file is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let candidate = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    };

    let settings = match candidate {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Loaded config from {}", path.display());
            Settings::from_toml(&text, &path)?
        }
        None => Settings::default(),
    };

    Ok(settings.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let text = r#"
[llm]
endpoint = "http://localhost:8000/v1"

[pipeline]
concurrency = 2
error_policy = "abort"
"#;
        let settings = Settings::from_toml(text, Path::new("test.toml")).unwrap();
        assert_eq!(settings.llm.endpoint, "http://localhost:8000/v1");
        assert_eq!(settings.llm.chat_model, "deepseek-chat");
        assert_eq!(settings.pipeline.concurrency, 2);
        assert_eq!(settings.pipeline.error_policy, ErrorPolicy::Abort);
        assert!(!settings.pipeline.strict_taxonomy);
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = Settings::from_toml("", Path::new("empty.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pipeline.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let err = Settings::from_toml("[pipeline]\nconcurrency = \"many\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
