//! The per-message relay pipeline.
//!
//! ```text
//! Route ─► Resolve ─► Decrypt ─► Forward ─► Encrypt ─► Publish
//! ```
//!
//! Stages run strictly in order for one message. A failure ends that
//! message's handling and nothing else.

use std::sync::Arc;

use nostr::{Event, EventId, PublicKey};
use tracing::{debug, error, info, warn, Level};

use super::error::{BridgeError, BridgeResult};
use crate::assistant::AssistantBackend;
use crate::nostr::{open, seal, InboundMessage, OutboundMessage};
use crate::registry::AssistantRegistry;
use crate::relay::Transport;

/// A reply that made it onto the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The inbound event that was answered.
    pub inbound_id: EventId,

    /// The published reply event.
    pub reply_id: EventId,

    /// The assistant that answered.
    pub assistant: PublicKey,

    /// The original sender, who receives the reply.
    pub recipient: PublicKey,

    /// How many relays accepted the reply.
    pub accepted_by: usize,
}

/// Relays direct messages between senders and assistant backends.
///
/// Cheap to clone; clones share the registry, backend and transport.
#[derive(Clone)]
pub struct Bridge {
    registry: Arc<AssistantRegistry>,
    backend: Arc<dyn AssistantBackend>,
    transport: Arc<dyn Transport>,
}

impl Bridge {
    /// Creates a bridge over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<AssistantRegistry>,
        backend: Arc<dyn AssistantBackend>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            registry,
            backend,
            transport,
        }
    }

    /// Runs the pipeline for one event and reports how it ended.
    ///
    /// # Errors
    ///
    /// Returns the [`BridgeError`] of the first stage that failed.
    pub async fn handle(&self, event: &Event) -> BridgeResult<Delivery> {
        // Route
        let inbound = InboundMessage::from_event(event).map_err(|e| BridgeError::MalformedEvent {
            event_id: event.id.to_hex(),
            reason: e.to_string(),
        })?;

        if self.registry.contains(&inbound.sender) {
            return Err(BridgeError::FromAssistant(event.id.to_hex()));
        }

        // Resolve
        let assistant = self
            .registry
            .resolve_tag(&inbound.recipient)
            .ok_or_else(|| BridgeError::UnknownRecipient(inbound.recipient.clone()))?;

        // Decrypt; the secret is reused to seal the reply
        let secret = assistant
            .keys
            .shared_secret(&inbound.sender)
            .map_err(|e| BridgeError::Decryption(e.to_string()))?;
        let plaintext =
            open(&secret, &inbound.ciphertext).map_err(|e| BridgeError::Decryption(e.to_string()))?;

        debug!(
            event_id = %inbound.event_id,
            assistant = %assistant.public_key(),
            message_len = plaintext.len(),
            "forwarding message to assistant"
        );

        // Forward
        let reply = self.backend.ask(&assistant.endpoint, &plaintext).await?;

        // Encrypt
        let ciphertext = seal(&secret, &reply).map_err(|e| BridgeError::Encryption(e.to_string()))?;
        let outbound = OutboundMessage::reply_to(&inbound, assistant.public_key(), ciphertext);
        let reply_event = outbound
            .sign(&assistant.keys)
            .map_err(|e| BridgeError::Signing(e.to_string()))?;

        // Publish
        let published = self.transport.publish(&reply_event).await?;

        Ok(Delivery {
            inbound_id: inbound.event_id,
            reply_id: reply_event.id,
            assistant: assistant.public_key(),
            recipient: outbound.recipient,
            accepted_by: published.success_count(),
        })
    }

    /// Runs the pipeline for one event and logs the outcome.
    ///
    /// Never fails: every per-message error is contained here.
    pub async fn process(&self, event: &Event) -> Option<Delivery> {
        match self.handle(event).await {
            Ok(delivery) => {
                info!(
                    event_id = %delivery.inbound_id,
                    reply_id = %delivery.reply_id,
                    assistant = %delivery.assistant,
                    recipient = %delivery.recipient,
                    accepted_by = delivery.accepted_by,
                    "reply published"
                );
                Some(delivery)
            }
            Err(err) => {
                log_failure(event, &err);
                None
            }
        }
    }
}

fn log_failure(event: &Event, err: &BridgeError) {
    let outcome = if err.is_expected() {
        "message ignored"
    } else {
        "message dropped"
    };

    let level = err.level();
    if level == Level::DEBUG {
        debug!(event_id = %event.id, sender = %event.pubkey, "{outcome}: {err}");
    } else if level == Level::INFO {
        info!(event_id = %event.id, sender = %event.pubkey, "{outcome}: {err}");
    } else if level == Level::WARN {
        warn!(event_id = %event.id, sender = %event.pubkey, "{outcome}: {err}");
    } else {
        error!(event_id = %event.id, sender = %event.pubkey, "{outcome}: {err}");
    }
}
