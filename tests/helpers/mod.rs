//! Reusable test doubles for bridge integration tests.
//!
//! The NIP-44 channel and event signing are REAL; only the relay and the
//! assistant HTTP endpoints are replaced, by [`MockTransport`] and
//! [`MockBackend`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assistant_bridge::assistant::{AssistantBackend, AssistantError, AssistantResult};
use assistant_bridge::bridge::Bridge;
use assistant_bridge::config::{
    AssistantEntry, BridgeConfig, DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS,
};
use assistant_bridge::nostr::{derive_shared_secret, direct_message_kind, open, seal};
use assistant_bridge::registry::AssistantRegistry;
use assistant_bridge::relay::{PublishResult, RelayError, RelayResult, Transport};
use async_trait::async_trait;
use nostr::{Event, EventBuilder, Filter, Keys, PublicKey, Tag};
use reqwest::Url;
use tokio::sync::{mpsc, Notify};

/// In-memory [`Transport`] that records what the bridge publishes.
pub struct MockTransport {
    inbox: Mutex<Option<mpsc::Receiver<Event>>>,
    published: Mutex<Vec<Event>>,
    filters: Mutex<Vec<Filter>>,
    fail_connect: AtomicBool,
    stall_connect: AtomicBool,
    fail_publish: AtomicBool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl MockTransport {
    /// A transport with no inbound stream; `subscribe` fails.
    pub fn new() -> Self {
        Self {
            inbox: Mutex::new(None),
            published: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            fail_connect: AtomicBool::new(false),
            stall_connect: AtomicBool::new(false),
            fail_publish: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// A transport whose subscription yields what is sent on the returned
    /// sender. Dropping the sender ends the stream.
    pub fn with_inbox() -> (Self, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(64);
        let transport = Self::new();
        *transport.inbox.lock().unwrap() = Some(rx);
        (transport, tx)
    }

    pub fn fail_connect(&self) {
        self.fail_connect.store(true, Ordering::SeqCst);
    }

    /// Makes `connect` wait forever, like an unreachable relay.
    pub fn stall_connect(&self) {
        self.stall_connect.store(true, Ordering::SeqCst);
    }

    pub fn fail_publish(&self) {
        self.fail_publish.store(true, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<Event> {
        self.published.lock().unwrap().clone()
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` events have been published.
    pub async fn wait_for_published(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.published.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for published events");
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> RelayResult<()> {
        if self.stall_connect.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(RelayError::Connection {
                url: "wss://relay.test".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn subscribe(&self, filter: Filter) -> RelayResult<mpsc::Receiver<Event>> {
        self.filters.lock().unwrap().push(filter);
        self.inbox
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| RelayError::Subscription("no inbox".to_string()))
    }

    async fn publish(&self, event: &Event) -> RelayResult<PublishResult> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RelayError::Closed);
        }
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(RelayError::Rejected {
                relay: "wss://relay.test".to_string(),
                reason: "blocked".to_string(),
            });
        }

        self.published.lock().unwrap().push(event.clone());
        Ok(PublishResult {
            event_id: event.id,
            accepted_by: vec!["wss://relay.test".to_string()],
            rejected_by: Vec::new(),
        })
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// How a [`MockBackend`] endpoint answers.
#[derive(Clone)]
pub enum Behavior {
    /// Reply with the message itself.
    Echo,
    /// Reply with a fixed string.
    Reply(String),
    /// Fail as if the endpoint were down.
    Unavailable,
    /// Fail as if the endpoint answered with a bad body.
    InvalidResponse,
    /// Wait for the notification, then reply with the fixed string.
    Gated(Arc<Notify>, String),
}

/// In-memory [`AssistantBackend`], configured per endpoint.
#[derive(Default)]
pub struct MockBackend {
    behaviors: Mutex<HashMap<String, Behavior>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, endpoint: &Url, behavior: Behavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), behavior);
    }

    /// `(endpoint, message)` pairs, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn ask(&self, endpoint: &Url, message: &str) -> AssistantResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), message.to_string()));

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(endpoint.as_str())
            .cloned()
            .unwrap_or(Behavior::Echo);

        match behavior {
            Behavior::Echo => Ok(message.to_string()),
            Behavior::Reply(reply) => Ok(reply),
            Behavior::Unavailable => Err(AssistantError::Unavailable(format!(
                "{endpoint}: connection refused"
            ))),
            Behavior::InvalidResponse => Err(AssistantError::InvalidResponse(
                "missing field `message`".to_string(),
            )),
            Behavior::Gated(gate, reply) => {
                gate.notified().await;
                Ok(reply)
            }
        }
    }
}

/// Endpoint URL of the `index`-th test assistant.
pub fn endpoint(index: usize) -> Url {
    Url::parse(&format!("http://assistant-{index}.test/ask")).unwrap()
}

pub fn assistant_entry(keys: &Keys, endpoint: &Url) -> AssistantEntry {
    AssistantEntry {
        pubkey: keys.public_key().to_hex(),
        privatekey: keys.secret_key().to_secret_hex(),
        assistant_url: endpoint.to_string(),
    }
}

/// A valid configuration for `assistants`, each on [`endpoint`]`(i)`.
pub fn config_for(assistants: &[Keys]) -> BridgeConfig {
    BridgeConfig {
        relay_url: "wss://relay.test".to_string(),
        assistants: assistants
            .iter()
            .enumerate()
            .map(|(i, keys)| assistant_entry(keys, &endpoint(i)))
            .collect(),
        backend_timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
        connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        replay_history: false,
    }
}

/// Builds a signed kind 4 event from `sender` to `recipient` with NIP-44
/// content, as a Nostr client would.
pub fn direct_message(sender: &Keys, recipient: &PublicKey, plaintext: &str) -> Event {
    let secret = derive_shared_secret(sender.secret_key(), recipient).unwrap();
    let ciphertext = seal(&secret, plaintext).unwrap();

    EventBuilder::new(direct_message_kind(), ciphertext)
        .tag(Tag::public_key(*recipient))
        .sign_with_keys(sender)
        .unwrap()
}

/// Builds a signed kind 4 event with arbitrary tags and content.
pub fn raw_event(sender: &Keys, tags: Vec<Tag>, content: &str) -> Event {
    EventBuilder::new(direct_message_kind(), content)
        .tags(tags)
        .sign_with_keys(sender)
        .unwrap()
}

/// Decrypts a reply the way its recipient would.
pub fn read_reply(reader: &Keys, reply: &Event) -> String {
    let secret = derive_shared_secret(reader.secret_key(), &reply.pubkey).unwrap();
    open(&secret, &reply.content).unwrap()
}

/// A bridge wired to in-memory collaborators.
pub struct Harness {
    pub bridge: Bridge,
    pub transport: Arc<MockTransport>,
    pub backend: Arc<MockBackend>,
    pub assistants: Vec<Keys>,
}

impl Harness {
    /// A bridge with `count` assistants, every backend echoing.
    pub fn new(count: usize) -> Self {
        Self::with_transport(count, MockTransport::new())
    }

    pub fn with_transport(count: usize, transport: MockTransport) -> Self {
        let assistants: Vec<Keys> = (0..count).map(|_| Keys::generate()).collect();
        let registry = AssistantRegistry::from_config(&config_for(&assistants)).unwrap();

        let transport = Arc::new(transport);
        let backend = Arc::new(MockBackend::new());
        let bridge = Bridge::new(Arc::new(registry), backend.clone(), transport.clone());

        Self {
            bridge,
            transport,
            backend,
            assistants,
        }
    }

    pub fn assistant(&self, index: usize) -> PublicKey {
        self.assistants[index].public_key()
    }
}
