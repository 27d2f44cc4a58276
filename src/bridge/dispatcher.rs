//! Task-per-event dispatch of inbound direct messages.

use std::future::Future;

use nostr::Event;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::pipeline::{Bridge, Delivery};

/// Counters for one dispatcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events handed to a pipeline task.
    pub dispatched: u64,
    /// Tasks that published a reply.
    pub replied: u64,
    /// Tasks that ended without a reply.
    pub dropped: u64,
    /// Tasks that panicked.
    pub panicked: u64,
    /// Tasks still running when shutdown aborted them.
    pub abandoned: u64,
}

impl DispatchStats {
    fn record(&mut self, joined: Result<Option<Delivery>, JoinError>) {
        match joined {
            Ok(Some(_)) => self.replied += 1,
            Ok(None) => self.dropped += 1,
            Err(e) if e.is_panic() => {
                error!(error = %e, "message task panicked");
                self.panicked += 1;
            }
            Err(e) => debug!(error = %e, "message task cancelled"),
        }
    }
}

/// Spawns one independent pipeline task per delivered event.
///
/// Tasks never wait on one another, so a slow assistant backend only delays
/// the messages addressed to it.
pub struct Dispatcher {
    bridge: Bridge,
}

impl Dispatcher {
    /// Creates a dispatcher for `bridge`.
    #[must_use]
    pub const fn new(bridge: Bridge) -> Self {
        Self { bridge }
    }

    /// Dispatches events until `shutdown` resolves or the stream ends.
    ///
    /// When the stream ends, in-flight tasks are awaited. When `shutdown`
    /// resolves first, no further event is accepted and in-flight tasks are
    /// aborted.
    pub async fn run<F>(&self, mut events: mpsc::Receiver<Event>, shutdown: F) -> DispatchStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut tasks: JoinSet<Option<Delivery>> = JoinSet::new();
        let mut stats = DispatchStats::default();

        let shutdown_requested = loop {
            tokio::select! {
                () = &mut shutdown => break true,
                received = events.recv() => {
                    let Some(event) = received else {
                        break false;
                    };
                    let bridge = self.bridge.clone();
                    tasks.spawn(async move { bridge.process(&event).await });
                    stats.dispatched += 1;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    stats.record(joined);
                }
            }
        };

        if shutdown_requested {
            info!("shutdown requested, no longer accepting messages");
            let in_flight = tasks.len();
            if in_flight > 0 {
                warn!(in_flight, "abandoning in-flight messages");
            }
            stats.abandoned = in_flight as u64;
            tasks.shutdown().await;
        } else {
            info!(in_flight = tasks.len(), "event stream ended, draining messages");
            while let Some(joined) = tasks.join_next().await {
                stats.record(joined);
            }
        }

        stats
    }
}
