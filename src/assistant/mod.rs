//! Assistant backend collaborator.
//!
//! The bridge hands each decrypted message to the assistant's HTTP endpoint
//! and encrypts whatever string comes back. The contract is strict: the
//! backend must answer `{"message": string}`; any other shape is an
//! [`AssistantError::InvalidResponse`] and no reply is sent.

mod client;
mod error;
mod types;

pub use client::{AssistantBackend, HttpAssistantBackend};
pub use error::{AssistantError, AssistantResult};
pub use types::{AssistantReply, AssistantRequest};
