//! Hosted chat-completion client used by the chatbot fallback path.

use async_trait::async_trait;
use thiserror::Error;

mod openai;

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request timed out")]
    Timeout,
    #[error("authentication rejected by the completion API")]
    Auth,
    #[error("completion API rate limit hit")]
    RateLimited,
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

/// A chat-completion backend. The chatbot only ever needs one call:
/// prompt in, text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
