//! Assistant Bridge
//!
//! Relays NIP-44 encrypted Nostr direct messages to HTTP AI assistants and
//! publishes their replies back to the sender.
//!
//! Each configured assistant has its own Nostr keypair and an HTTP endpoint.
//! A direct message addressed to an assistant is decrypted, forwarded to the
//! endpoint, and the answer is sealed with the same shared secret and
//! published as a reply from the assistant's key.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

pub mod assistant;
pub mod bridge;
pub mod config;
pub mod nostr;
pub mod registry;
pub mod relay;
pub mod supervisor;

pub use bridge::{Bridge, BridgeError, DispatchStats, Dispatcher};
pub use config::{BridgeConfig, ConfigError};
pub use supervisor::{shutdown_signal, Supervisor, SupervisorError};
