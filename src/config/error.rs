//! Error types for configuration loading and validation.

use thiserror::Error;

/// Errors that can occur while loading the bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Config file not readable: {0}")]
    FileNotFound(String),

    /// The configuration is not valid JSON for the expected shape.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds an unusable value.
    #[error("Config validation error: {0}")]
    Validation(String),

    /// An assistant key could not be parsed.
    #[error("Invalid key for assistant {pubkey}: {reason}")]
    InvalidKey {
        /// The assistant's configured public key.
        pubkey: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// The private key does not derive the declared public key.
    #[error("Private key for assistant {0} does not match its public key")]
    KeyMismatch(String),

    /// Two assistants share a public key.
    #[error("Duplicate assistant public key: {0}")]
    DuplicateAssistant(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
