//! Chat-completions client for OpenAI-compatible APIs.
//!
//! Two calling conventions are supported: a single-shot request that returns
//! the whole answer at once, and a streaming request whose `content` deltas
//! are concatenated while `reasoning_content` deltas are optionally echoed.

mod config;
mod stream;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::ChatModel;

pub use config::LlmConfig;
pub use stream::{
    parse_chunk, ReasoningEcho, SseDecoder, SseEvent, StreamAccumulator, StreamFragment,
};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to reach the service
    #[error("Connection error: {0}")]
    Connection(String),
    /// Service answered with a non-success status
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
    /// Stream broke off or reported an error mid-way
    #[error("Stream error: {0}")]
    Stream(String),
    /// No API key configured
    #[error("No API key configured (set DEEPSEEK_API_KEY or LLM_API_KEY)")]
    MissingApiKey,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// LLM client shared by every row task of a run.
///
/// `reqwest::Client` pools connections internally and is safe to use from
/// many in-flight requests at once.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)
    }

    /// List models offered by the endpoint.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let api_key = self.api_key()?;
        let resp = self
            .client
            .get(self.config.url("models"))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let resp = check_status(resp).await?;

        #[derive(Deserialize)]
        struct ModelsResponse {
            data: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            id: String,
        }

        let models: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(models.data.into_iter().map(|m| m.id).collect())
    }

    async fn send(
        &self,
        model: &str,
        system: &str,
        user: &str,
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let api_key = self.api_key()?;
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream,
        };

        let resp = self
            .client
            .post(self.config.url("chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Api { status, body })
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        debug!("Single-shot request to {}", self.config.chat_model);
        let resp = self
            .send(&self.config.chat_model, system, user, false)
            .await?;

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::Parse("Response contained no choices".to_string()))
    }

    async fn reason(
        &self,
        system: &str,
        user: &str,
        echo: ReasoningEcho,
    ) -> Result<String, LlmError> {
        debug!("Streaming request to {}", self.config.reasoner_model);
        let resp = self
            .send(&self.config.reasoner_model, system, user, true)
            .await?;

        let mut body = resp.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut acc = StreamAccumulator::new(echo);
        let mut chunks = 0usize;

        'drain: while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(|e| LlmError::Stream(e.to_string()))?;
            for event in decoder.push(&bytes) {
                match event {
                    SseEvent::Data(payload) => {
                        chunks += 1;
                        for fragment in parse_chunk(&payload)? {
                            acc.push(fragment);
                        }
                    }
                    SseEvent::Done => break 'drain,
                }
            }
        }
        for event in decoder.finish() {
            if let SseEvent::Data(payload) = event {
                chunks += 1;
                for fragment in parse_chunk(&payload)? {
                    acc.push(fragment);
                }
            }
        }

        info!(
            "Stream finished after {} chunks ({} content bytes)",
            chunks,
            acc.content().len()
        );
        Ok(acc.into_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "deepseek-chat",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_sending() {
        // Unroutable endpoint: reaching the network would surface a connection error
        let client =
            LlmClient::new(LlmConfig::default().with_endpoint("http://127.0.0.1:9")).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
