//! Error types for Nostr key handling, encryption and event construction.

use thiserror::Error;

/// Errors that can occur while handling keys, payloads and events.
#[derive(Error, Debug)]
pub enum NostrError {
    /// A public or secret key is malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption operation failed.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Event signing failed.
    #[error("Event signing failed: {0}")]
    Signing(String),

    /// The event carries no `p` tag naming its recipient.
    #[error("Event {0} has no recipient tag")]
    MissingRecipient(String),
}

/// Result type for Nostr operations.
pub type Result<T> = std::result::Result<T, NostrError>;
