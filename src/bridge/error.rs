//! Per-message failures of the bridge pipeline.
//!
//! None of these escape the handling of the message that caused them; the
//! dispatcher logs them and moves on.

use thiserror::Error;
use tracing::Level;

use crate::assistant::AssistantError;
use crate::relay::RelayError;

/// Why one inbound direct message produced no reply.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The event could not be read as a direct message (e.g. no `p` tag).
    #[error("Malformed event {event_id}: {reason}")]
    MalformedEvent {
        /// Hex ID of the offending event.
        event_id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The event was authored by one of the bridged assistants.
    #[error("Event {0} was sent by a bridged assistant")]
    FromAssistant(String),

    /// No assistant is configured for the recipient.
    #[error("No assistant configured for recipient {0}")]
    UnknownRecipient(String),

    /// The ciphertext could not be opened.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The assistant backend could not be reached.
    #[error("Assistant backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The assistant backend answered with an error or a bad reply.
    #[error("Assistant backend error: {0}")]
    Backend(String),

    /// The reply could not be sealed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The reply event could not be signed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The reply could not be published.
    #[error("Transport error: {0}")]
    Transport(#[from] RelayError),
}

impl BridgeError {
    /// Whether this is a normal outcome rather than a fault.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::UnknownRecipient(_) | Self::FromAssistant(_))
    }

    /// Level the failure is logged at.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::UnknownRecipient(_) => Level::INFO,
            Self::FromAssistant(_) => Level::DEBUG,
            Self::MalformedEvent { .. } => Level::WARN,
            _ => Level::ERROR,
        }
    }
}

impl From<AssistantError> for BridgeError {
    fn from(err: AssistantError) -> Self {
        if err.is_unavailable() {
            Self::BackendUnavailable(err.to_string())
        } else {
            Self::Backend(err.to_string())
        }
    }
}

/// Result type for the bridge pipeline.
pub type BridgeResult<T> = Result<T, BridgeError>;
