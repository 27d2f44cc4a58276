//! Error types for assistant backend calls.

use thiserror::Error;

/// Errors that can occur while asking an assistant backend.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The backend could not be reached or did not answer in time.
    #[error("Assistant backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-success status.
    #[error("Assistant backend returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The backend answered with something other than `{"message": string}`.
    #[error("Invalid assistant response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be built.
    #[error("Assistant client initialization failed: {0}")]
    Initialization(String),
}

impl AssistantError {
    /// Whether the failure is about reaching the backend rather than what
    /// it answered.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for assistant backend calls.
pub type AssistantResult<T> = Result<T, AssistantError>;
