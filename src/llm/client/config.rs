//! LLM client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the chat-completions client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL (default: https://api.deepseek.com/v1)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key sent as a bearer token
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model used for single-shot completions (classification)
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model used for streaming reasoning completions (document generation)
    #[serde(default = "default_reasoner_model")]
    pub reasoner_model: String,
    /// Whole-request timeout in seconds; unset means wait indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_chat_model() -> String {
    "deepseek-chat".to_string()
}

fn default_reasoner_model() -> String {
    "deepseek-reasoner".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            chat_model: default_chat_model(),
            reasoner_model: default_reasoner_model(),
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_API_KEY`: API key (wins over `DEEPSEEK_API_KEY`)
    /// - `DEEPSEEK_API_KEY`: API key for the default DeepSeek endpoint
    /// - `LLM_ENDPOINT`: API base URL
    /// - `LLM_CHAT_MODEL`: model for single-shot calls
    /// - `LLM_REASONER_MODEL`: model for streaming reasoning calls
    /// - `LLM_TIMEOUT_SECS`: request timeout in seconds
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Blank values count as unset.
    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(val) = var("LLM_API_KEY") {
            self.api_key = Some(val);
        } else if self.api_key.is_none() {
            self.api_key = var("DEEPSEEK_API_KEY");
        }
        if let Some(val) = var("LLM_ENDPOINT") {
            self.endpoint = val;
        }
        if let Some(val) = var("LLM_CHAT_MODEL") {
            self.chat_model = val;
        }
        if let Some(val) = var("LLM_REASONER_MODEL") {
            self.reasoner_model = val;
        }
        if let Some(val) = var("LLM_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = Some(n);
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Full URL of an API route under the configured endpoint.
    pub fn url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.endpoint, "https://api.deepseek.com/v1");
        assert_eq!(config.chat_model, "deepseek-chat");
        assert_eq!(config.reasoner_model, "deepseek-reasoner");
        assert!(config.api_key.is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = LlmConfig::default().with_endpoint("http://localhost:8080/v1/");
        assert_eq!(
            config.url("/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.url("models"), "http://localhost:8080/v1/models");
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_llm_api_key_wins() {
        let config = LlmConfig::default().with_overrides_from(env(&[
            ("LLM_API_KEY", "sk-llm"),
            ("DEEPSEEK_API_KEY", "sk-deepseek"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-llm"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = LlmConfig::default().with_overrides_from(env(&[
            ("LLM_API_KEY", ""),
            ("DEEPSEEK_API_KEY", "sk-deepseek"),
            ("LLM_ENDPOINT", "  "),
            ("LLM_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-deepseek"));
        assert_eq!(config.endpoint, "https://api.deepseek.com/v1");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));

        let config = LlmConfig::default().with_overrides_from(env(&[("DEEPSEEK_API_KEY", "")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = LlmConfig::default().with_api_key("sk-secret");
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("deepseek-chat"));
    }
}
