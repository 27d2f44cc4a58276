//! Types for relay publish results.

use nostr::EventId;

/// Result of publishing an event to relays.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// The event ID that was published.
    pub event_id: EventId,
    /// Relays that accepted the event.
    pub accepted_by: Vec<String>,
    /// Relays that rejected the event (with reasons).
    pub rejected_by: Vec<(String, String)>,
}

impl PublishResult {
    /// Returns true if at least one relay accepted the event.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !self.accepted_by.is_empty()
    }

    /// Returns the number of successful relays.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.accepted_by.len()
    }
}
