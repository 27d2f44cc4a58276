//! Error types for relay operations.
//!
//! This module defines error types that can occur during relay
//! communication and event publishing.

use thiserror::Error;

/// Errors that can occur during relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Connection to relay failed.
    #[error("Failed to connect to relay {url}: {reason}")]
    Connection {
        /// The relay URL that failed.
        url: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Event publishing failed.
    #[error("Failed to publish event: {0}")]
    Publish(String),

    /// Invalid relay URL.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// Subscription failed.
    #[error("Subscription failed: {0}")]
    Subscription(String),

    /// Relay rejected the event.
    #[error("Relay {relay} rejected event: {reason}")]
    Rejected {
        /// The relay that rejected the event.
        relay: String,
        /// The rejection reason.
        reason: String,
    },

    /// Timeout waiting for operation.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The transport was closed by shutdown.
    #[error("Relay transport is closed")]
    Closed,
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_display() {
        let error = RelayError::Connection {
            url: "wss://relay.example.com".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to connect to relay wss://relay.example.com: connection refused"
        );
    }

    #[test]
    fn publish_error_display() {
        let error = RelayError::Publish("rate limited".to_string());
        assert_eq!(error.to_string(), "Failed to publish event: rate limited");
    }

    #[test]
    fn invalid_url_error_display() {
        let error = RelayError::InvalidUrl("https://relay".to_string());
        assert_eq!(error.to_string(), "Invalid relay URL: https://relay");
    }

    #[test]
    fn subscription_error_display() {
        let error = RelayError::Subscription("filter too broad".to_string());
        assert_eq!(error.to_string(), "Subscription failed: filter too broad");
    }

    #[test]
    fn rejected_error_display() {
        let error = RelayError::Rejected {
            relay: "wss://relay.example.com".to_string(),
            reason: "blocked".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Relay wss://relay.example.com rejected event: blocked"
        );
    }

    #[test]
    fn timeout_error_display() {
        let error = RelayError::Timeout("event publish".to_string());
        assert_eq!(error.to_string(), "Operation timed out: event publish");
    }

    #[test]
    fn closed_error_display() {
        assert_eq!(RelayError::Closed.to_string(), "Relay transport is closed");
    }
}
