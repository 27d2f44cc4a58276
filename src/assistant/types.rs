//! Wire types exchanged with assistant backends.

use serde::{Deserialize, Serialize};

/// Body POSTed to an assistant endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRequest {
    /// The decrypted direct message.
    pub message: String,
}

/// Body an assistant endpoint must answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// The reply text, encrypted back to the sender.
    pub message: String,
}
