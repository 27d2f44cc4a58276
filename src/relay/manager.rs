//! Relay transport backed by a `nostr-sdk` client.
//!
//! The client holds no signer: reply events arrive already signed by the
//! assistant they come from. A single relay URL is used for both the
//! subscription and publishing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nostr::{Event, Filter, RelayUrl, SubscriptionId};
use nostr_sdk::{Client, RelayPoolNotification};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::{RelayError, RelayResult};
use super::transport::Transport;
use super::types::PublishResult;
use crate::nostr::direct_message_kind;

/// Default timeout for publishing one event.
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between connection checks while waiting for the relay.
const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capacity of the channel between relay notifications and the bridge.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// [`Transport`] over one Nostr relay.
///
/// # Example
///
/// ```rust,ignore
/// use assistant_bridge::relay::{RelayTransport, Transport};
///
/// let transport = RelayTransport::new("wss://relay.example.com", Duration::from_secs(30))?;
/// transport.connect().await?;
/// let mut events = transport.subscribe(filter).await?;
/// ```
pub struct RelayTransport {
    /// The nostr-sdk client; `None` once closed.
    client: Arc<RwLock<Option<Client>>>,

    /// The relay this transport talks to.
    relay_url: RelayUrl,

    /// Bound on the initial connection.
    connect_timeout: Duration,

    /// Tasks feeding subscription channels; aborted on close.
    forwarders: Mutex<Vec<JoinHandle<()>>>,
}

impl RelayTransport {
    /// Creates a transport for `relay_url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUrl`] if the URL is not a ws(s) URL.
    pub fn new(relay_url: &str, connect_timeout: Duration) -> RelayResult<Self> {
        let relay_url = Self::validate_relay_url(relay_url)?;
        let client = Client::builder().build();

        Ok(Self {
            client: Arc::new(RwLock::new(Some(client))),
            relay_url,
            connect_timeout,
            forwarders: Mutex::new(Vec::new()),
        })
    }

    async fn client(&self) -> RelayResult<Client> {
        let client_guard = self.client.read().await;
        client_guard.clone().ok_or(RelayError::Closed)
    }

    async fn wait_until_connected(client: &Client) {
        loop {
            let relays = client.relays().await;
            if relays.values().any(nostr_sdk::Relay::is_connected) {
                return;
            }
            tokio::time::sleep(CONNECT_POLL_INTERVAL).await;
        }
    }

    /// Validates a relay URL; both ws:// and wss:// are accepted.
    fn validate_relay_url(relay: &str) -> RelayResult<RelayUrl> {
        RelayUrl::parse(relay.trim()).map_err(|e| RelayError::InvalidUrl(format!("{relay}: {e}")))
    }
}

/// Forwards direct messages of `subscription_id` from the pool's
/// notification channel into `tx`.
///
/// Returns when the pool shuts down, the notification channel closes or
/// the receiving side of `tx` is dropped. A lagging receiver loses the
/// skipped notifications but keeps forwarding.
async fn forward_events(
    mut notifications: broadcast::Receiver<RelayPoolNotification>,
    subscription_id: SubscriptionId,
    tx: mpsc::Sender<Event>,
) {
    let kind = direct_message_kind();

    loop {
        match notifications.recv().await {
            Ok(RelayPoolNotification::Event {
                subscription_id: received_on,
                event,
                ..
            }) => {
                // Only direct messages reach the bridge
                if received_on != subscription_id || event.kind != kind {
                    continue;
                }
                if tx.send(*event).await.is_err() {
                    debug!("event receiver dropped, stop forwarding");
                    return;
                }
            }
            Ok(RelayPoolNotification::Shutdown) => {
                debug!("relay pool shut down, stop forwarding");
                return;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "relay notifications lagged, events were lost");
            }
            Err(RecvError::Closed) => return,
        }
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn connect(&self) -> RelayResult<()> {
        let client = self.client().await?;

        client
            .add_relay(self.relay_url.as_str())
            .await
            .map_err(|e| RelayError::Connection {
                url: self.relay_url.to_string(),
                reason: e.to_string(),
            })?;

        client.connect().await;

        tokio::time::timeout(self.connect_timeout, Self::wait_until_connected(&client))
            .await
            .map_err(|_| RelayError::Connection {
                url: self.relay_url.to_string(),
                reason: format!("not connected after {:?}", self.connect_timeout),
            })?;

        info!(relay = %self.relay_url, "connected to relay");
        Ok(())
    }

    async fn subscribe(&self, filter: Filter) -> RelayResult<mpsc::Receiver<Event>> {
        let client = self.client().await?;

        // Listen before sending the REQ so stored events are not missed
        let notifications = client.notifications();

        let subscription_id = client
            .subscribe(filter, None)
            .await
            .map_err(|e| RelayError::Subscription(e.to_string()))?
            .val;

        debug!(subscription = ?subscription_id, "subscribed to direct messages");

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let forwarder = tokio::spawn(forward_events(notifications, subscription_id, tx));
        self.forwarders.lock().await.push(forwarder);

        Ok(rx)
    }

    async fn publish(&self, event: &Event) -> RelayResult<PublishResult> {
        let client = self.client().await?;

        let output = tokio::time::timeout(PUBLISH_TIMEOUT, client.send_event(event))
            .await
            .map_err(|_| RelayError::Timeout("Event publish timed out".to_string()))?
            .map_err(|e| RelayError::Publish(e.to_string()))?;

        let result = PublishResult {
            event_id: event.id,
            accepted_by: output.success.iter().map(ToString::to_string).collect(),
            rejected_by: output
                .failed
                .iter()
                .map(|(url, reason)| (url.to_string(), reason.clone()))
                .collect(),
        };

        if result.is_success() {
            Ok(result)
        } else if let Some((relay, reason)) = result.rejected_by.first() {
            Err(RelayError::Rejected {
                relay: relay.clone(),
                reason: reason.clone(),
            })
        } else {
            Err(RelayError::Publish("no relay accepted the event".to_string()))
        }
    }

    async fn close(&self) {
        // Ends every subscription stream
        for forwarder in self.forwarders.lock().await.drain(..) {
            forwarder.abort();
        }

        let client = self.client.write().await.take();
        if let Some(client) = client {
            client.shutdown().await;
            info!(relay = %self.relay_url, "relay connection closed");
        }
    }
}
