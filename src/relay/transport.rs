//! The transport seam between the bridge and the relay network.

use async_trait::async_trait;
use nostr::{Event, Filter};
use tokio::sync::mpsc;

use super::error::RelayResult;
use super::types::PublishResult;

/// One persistent connection to the messaging network.
///
/// Implementations must tolerate concurrent `publish` calls from many
/// in-flight message handlers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the connection.
    async fn connect(&self) -> RelayResult<()>;

    /// Subscribes to `filter`, yielding matching events as they arrive.
    ///
    /// The stream ends when the transport is closed or the relay pool shuts
    /// down.
    async fn subscribe(&self, filter: Filter) -> RelayResult<mpsc::Receiver<Event>>;

    /// Publishes a signed event.
    async fn publish(&self, event: &Event) -> RelayResult<PublishResult>;

    /// Closes the connection. Later `publish` calls fail instead of panicking.
    async fn close(&self);
}
