//! Relay transport.
//!
//! The bridge talks to the Nostr network through the [`Transport`] trait:
//! connect once, subscribe to direct messages, publish replies, close on
//! shutdown. [`RelayTransport`] implements it over a `nostr-sdk` client.
//!
//! # Architecture
//!
//! ```text
//! Bridge
//!     │ publish(reply)          ▲ subscribe(kind 4)
//!     ▼                         │
//! RelayTransport (nostr-sdk Client)
//!     │
//!     ▼
//! Nostr Relay
//! ```
//!
//! Publishing after [`Transport::close`] returns [`RelayError::Closed`], so
//! a backend reply that lands during shutdown is dropped and logged rather
//! than crashing the process.

mod error;
mod manager;
mod transport;
mod types;

pub use error::{RelayError, RelayResult};
pub use manager::RelayTransport;
pub use transport::Transport;
pub use types::PublishResult;
