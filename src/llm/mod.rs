//! LLM integration for document generation and classification.
//!
//! Both pipeline stages talk to the model through the [`ChatModel`] trait.
//! [`LlmClient`] implements it against an OpenAI-compatible chat-completions
//! API (DeepSeek by default).

mod client;

use async_trait::async_trait;

pub use client::{
    LlmClient, LlmConfig, LlmError, ReasoningEcho, SseDecoder, StreamAccumulator, StreamFragment,
};

/// A chat model that accepts a system and a user message.
///
/// Implementations must be safe to share between concurrently running row
/// tasks; the pipeline holds one instance behind an `Arc` for the whole run.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Single-shot completion: block until the full answer is available.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Streaming reasoning completion.
    ///
    /// Returns the concatenated `content` fragments. Reasoning fragments are
    /// never part of the result; they are only echoed when `echo` asks for it.
    async fn reason(&self, system: &str, user: &str, echo: ReasoningEcho)
        -> Result<String, LlmError>;
}
