//! Direct-message events handled by the bridge.
//!
//! - [`InboundMessage`]: a received kind 4 event, addressed to an assistant
//! - [`OutboundMessage`]: the encrypted reply, signed into a kind 4 event
//!
//! Both are ephemeral: they live for one pipeline invocation and are never
//! persisted.

use nostr::{Event, EventBuilder, EventId, Kind, PublicKey, Tag, Timestamp};

use crate::nostr::error::{NostrError, Result};
use crate::nostr::keys::AssistantKeys;
use crate::nostr::tags::TagBuilder;

/// Event kind for direct messages.
pub const KIND_DIRECT_MESSAGE: u16 = 4;

/// Returns the direct-message [`Kind`].
#[must_use]
pub fn direct_message_kind() -> Kind {
    Kind::from(KIND_DIRECT_MESSAGE)
}

/// A received direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// ID of the relay event this message came from.
    pub event_id: EventId,

    /// Public key of the sender.
    pub sender: PublicKey,

    /// Raw value of the `p` tag; the intended recipient.
    pub recipient: String,

    /// NIP-44 payload.
    pub ciphertext: String,

    /// When the sender created the event.
    pub created_at: Timestamp,
}

impl InboundMessage {
    /// Extracts a direct message from a relay event.
    ///
    /// The kind is not checked here; the relay subscription only delivers
    /// direct messages.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::MissingRecipient`] if the event has no `p` tag.
    pub fn from_event(event: &Event) -> Result<Self> {
        let recipient = TagBuilder::recipient(event.tags.iter())
            .ok_or_else(|| NostrError::MissingRecipient(event.id.to_hex()))?;

        Ok(Self {
            event_id: event.id,
            sender: event.pubkey,
            recipient: recipient.to_string(),
            ciphertext: event.content.clone(),
            created_at: event.created_at,
        })
    }
}

/// An encrypted reply ready to be signed and published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// The assistant sending the reply.
    pub sender: PublicKey,

    /// The original sender, now the recipient.
    pub recipient: PublicKey,

    /// NIP-44 payload of the reply.
    pub ciphertext: String,

    /// Creation time of the reply event.
    pub created_at: Timestamp,
}

impl OutboundMessage {
    /// Builds the reply to `inbound`, stamped with the current time.
    #[must_use]
    pub fn reply_to(inbound: &InboundMessage, sender: PublicKey, ciphertext: String) -> Self {
        Self {
            sender,
            recipient: inbound.sender,
            ciphertext,
            created_at: Timestamp::now(),
        }
    }

    /// Signs the reply into a kind 4 event tagged `["p", recipient]`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::Signing`] if `keys` do not belong to the sender
    /// or signing fails.
    pub fn sign(&self, keys: &AssistantKeys) -> Result<Event> {
        if keys.public_key() != self.sender {
            return Err(NostrError::Signing(format!(
                "keys for {} cannot sign as {}",
                keys.pubkey_hex(),
                self.sender.to_hex()
            )));
        }

        let signing_keys = keys.signing_keys()?;
        let recipient_tag = Tag::parse(&TagBuilder::p_tag(&self.recipient.to_hex()))
            .map_err(|e| NostrError::Signing(e.to_string()))?;

        EventBuilder::new(direct_message_kind(), self.ciphertext.clone())
            .tag(recipient_tag)
            .custom_created_at(self.created_at)
            .sign_with_keys(&signing_keys)
            .map_err(|e| NostrError::Signing(e.to_string()))
    }
}
