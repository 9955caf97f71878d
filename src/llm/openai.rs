//! OpenAI-compatible chat completions client.
//!
//! Talks to `<api_base>/chat/completions` over a shared `reqwest::Client`.
//! Transport errors, 429, and 5xx responses are retried with exponential
//! back-off; any other 4xx is returned immediately.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChatMessage, ChatModel, LlmError};
use crate::config::Settings;

/// Initial delay between retries; doubles on each attempt.
const RETRY_DELAY_INITIAL: Duration = Duration::from_secs(1);

/// Chat completion client for the OpenAI API and compatible servers.
#[derive(Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
}

impl OpenAiChat {
    /// Create a client from settings, building a fresh HTTP client.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    /// Create a client that shares an existing HTTP client.
    pub fn with_client(client: reqwest::Client, settings: &Settings) -> Self {
        Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_retries: settings.max_retries,
        }
    }

    /// Full URL of the completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn build_request_body(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
        })
    }

    fn parse_response(body: &Value) -> Result<String, LlmError> {
        let choice = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| LlmError::Decode("response has no choices".to_string()))?;

        match choice.pointer("/message/content") {
            Some(Value::String(content)) => Ok(content.clone()),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let endpoint = self.endpoint();
        let body = self.build_request_body(messages);

        log::debug!(
            "OpenAiChat.complete: model={}, messages={}",
            self.model,
            messages.len()
        );

        let mut last_error = String::new();
        let mut retry_delay = RETRY_DELAY_INITIAL;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("Chat API retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&endpoint)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "rate limited (429)".to_string();
                continue;
            }

            if status.is_server_error() {
                last_error = format!("server error: {}", status);
                continue;
            }

            let text = response.text().await?;

            if !status.is_success() {
                return Err(LlmError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                LlmError::Decode(format!(
                    "{} - body: {}",
                    e,
                    text.chars().take(500).collect::<String>()
                ))
            })?;

            return Self::parse_response(&json);
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_base: "http://localhost:9999/v1/".to_string(),
            model: "test-model".to_string(),
            api_key: None,
            ..Settings::default()
        }
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let chat = OpenAiChat::from_settings(&settings()).unwrap();
        assert_eq!(chat.endpoint(), "http://localhost:9999/v1/chat/completions");
        assert_eq!(chat.model(), "test-model");
    }

    #[test]
    fn test_request_body_shape() {
        let chat = OpenAiChat::from_settings(&settings()).unwrap();
        let body = chat.build_request_body(&[ChatMessage::user("hi")]);
        assert_eq!(
            body,
            json!({"model": "test-model", "messages": [{"role": "user", "content": "hi"}]})
        );
    }

    #[test]
    fn test_parse_response() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "4"}}]});
        assert_eq!(OpenAiChat::parse_response(&body).unwrap(), "4");

        let empty = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert!(matches!(
            OpenAiChat::parse_response(&empty),
            Err(LlmError::EmptyResponse)
        ));

        assert!(matches!(
            OpenAiChat::parse_response(&json!({})),
            Err(LlmError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_api_key_fails_before_network() {
        let chat = OpenAiChat::from_settings(&settings()).unwrap();
        let err = chat.complete_blocking(&[ChatMessage::user("hi")]).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
