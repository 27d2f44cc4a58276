//! HTTP client for assistant backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::error::{AssistantError, AssistantResult};
use super::types::{AssistantReply, AssistantRequest};

/// Longest slice of an error body kept in [`AssistantError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Something that answers a decrypted message with a reply.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Sends `message` to the assistant at `endpoint` and awaits its reply.
    async fn ask(&self, endpoint: &Url, message: &str) -> AssistantResult<String>;
}

/// [`AssistantBackend`] speaking JSON over HTTP.
///
/// Requests are `POST {"message": "..."}`; replies must be
/// `{"message": "..."}` with a non-empty string.
#[derive(Debug, Clone)]
pub struct HttpAssistantBackend {
    client: Client,
}

impl HttpAssistantBackend {
    /// Creates a backend whose calls are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Initialization`] if the HTTP client cannot
    /// be built.
    pub fn new(timeout: Duration) -> AssistantResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Initialization(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    async fn ask(&self, endpoint: &Url, message: &str) -> AssistantResult<String> {
        let request = AssistantRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Unavailable(format!("{endpoint} timed out"))
                } else {
                    AssistantError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AssistantError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            let body: String = String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: AssistantReply = serde_json::from_slice(&body)
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;

        if reply.message.is_empty() {
            return Err(AssistantError::InvalidResponse(
                "reply message is empty".to_string(),
            ));
        }

        debug!(endpoint = %endpoint, reply_len = reply.message.len(), "assistant replied");
        Ok(reply.message)
    }
}
