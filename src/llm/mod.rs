//! Language model access for capabilities.
//!
//! Capabilities never construct a client themselves; a [`ChatModel`] is
//! injected through [`Services`](crate::capabilities::Services) and owned
//! by the capability from then on.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use openai::OpenAiChat;

/// Errors from a chat completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured.
    #[error("API key not set. Set OPENAI_API_KEY or configure api_key in the settings file.")]
    MissingApiKey,

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response body was not what we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response carried no message content.
    #[error("response contained no message content")]
    EmptyResponse,

    /// Retries ran out on transient failures.
    #[error("request failed after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// The blocking runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, `assistant`, or `tool`.
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an arbitrary role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier.
    fn model(&self) -> &str;

    /// Send `messages` and return the assistant reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Blocking form of [`ChatModel::complete`] for the synchronous
    /// dispatcher. Must not be called from inside an async runtime.
    fn complete_blocking(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.complete(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubChat;

    #[test]
    fn test_chat_message_deserialize_defaults_content() {
        let msg: ChatMessage = serde_json::from_str(r#"{"role": "user"}"#).unwrap();
        assert_eq!(msg, ChatMessage::user(""));
    }

    #[test]
    fn test_complete_blocking_drives_future() {
        let chat = StubChat::replying("4");
        let reply = chat
            .complete_blocking(&[ChatMessage::user("What is 2+2?")])
            .unwrap();
        assert_eq!(reply, "4");
        assert_eq!(chat.requests().len(), 1);
    }

    #[test]
    fn test_complete_async() {
        let chat = StubChat::replying("pong");
        let reply = tokio_test::block_on(chat.complete(&[ChatMessage::user("ping")])).unwrap();
        assert_eq!(reply, "pong");
    }
}
