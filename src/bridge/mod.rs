//! The bridge between direct messages and assistant backends.
//!
//! # Architecture
//!
//! ```text
//! Transport ──events──► Dispatcher ──spawn per event──► Bridge::process
//!                                                          │
//!                        AssistantRegistry ◄── resolve ────┤
//!                        NIP-44 channel    ◄── open/seal ──┤
//!                        AssistantBackend  ◄── ask ────────┤
//!                        Transport         ◄── publish ────┘
//! ```
//!
//! Each message is handled by its own task; there is no ordering between
//! messages, and a failure in one never reaches another or the
//! subscription.

mod dispatcher;
mod error;
mod pipeline;

pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::{BridgeError, BridgeResult};
pub use pipeline::{Bridge, Delivery};
