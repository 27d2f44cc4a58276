//! Nostr keys, NIP-44 channel and direct-message events.
//!
//! # Architecture
//!
//! ```text
//! kind 4 Event ──► InboundMessage ──► open(SharedSecret, ciphertext)
//!                                              │
//!                                       assistant reply
//!                                              ▼
//! kind 4 Event ◄── OutboundMessage ◄── seal(SharedSecret, reply)
//! ```
//!
//! The same [`SharedSecret`] serves both directions: it is derived from the
//! assistant's secret key and the sender's public key, which equals the
//! secret the sender derives from their own secret key and the assistant's
//! public key.

mod error;
mod event;
mod keys;
mod tags;

pub mod encryption;

pub use encryption::{derive_shared_secret, open, seal, SharedSecret};
pub use error::{NostrError, Result};
pub use event::{direct_message_kind, InboundMessage, OutboundMessage, KIND_DIRECT_MESSAGE};
pub use keys::AssistantKeys;
pub use tags::{TagBuilder, RECIPIENT_TAG};
