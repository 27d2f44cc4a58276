//! Process lifecycle: connect, subscribe, dispatch, shut down.

use std::future::Future;
use std::sync::Arc;

use nostr::{Filter, Timestamp};
use thiserror::Error;
use tracing::{info, warn};

use crate::assistant::{AssistantBackend, AssistantError, HttpAssistantBackend};
use crate::bridge::{Bridge, DispatchStats, Dispatcher};
use crate::config::{BridgeConfig, ConfigError};
use crate::nostr::direct_message_kind;
use crate::registry::AssistantRegistry;
use crate::relay::{RelayError, RelayTransport, Transport};

/// Failures that stop the bridge from starting.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The relay could not be reached or subscribed to.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// The assistant HTTP client could not be built.
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

/// Owns the collaborators and sequences startup and shutdown.
pub struct Supervisor {
    config: BridgeConfig,
    registry: Arc<AssistantRegistry>,
    transport: Arc<dyn Transport>,
    backend: Arc<dyn AssistantBackend>,
}

impl Supervisor {
    /// Builds the production collaborators from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry, relay URL or HTTP client is invalid.
    pub fn new(config: BridgeConfig) -> Result<Self, SupervisorError> {
        let transport = RelayTransport::new(&config.relay_url, config.connect_timeout())?;
        let backend = HttpAssistantBackend::new(config.backend_timeout())?;
        Self::with_collaborators(config, Arc::new(transport), Arc::new(backend))
    }

    /// Builds a supervisor over caller-provided collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be built from `config`.
    pub fn with_collaborators(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
        backend: Arc<dyn AssistantBackend>,
    ) -> Result<Self, SupervisorError> {
        let registry = Arc::new(AssistantRegistry::from_config(&config)?);

        for assistant in registry.public_keys() {
            info!(assistant = %assistant, "assistant registered");
        }

        Ok(Self {
            config,
            registry,
            transport,
            backend,
        })
    }

    /// The relay subscription: direct messages to any configured assistant.
    ///
    /// Unless `replayHistory` is set, messages stored before startup are
    /// skipped so a restart does not answer them twice.
    #[must_use]
    pub fn subscription_filter(&self) -> Filter {
        let filter = Filter::new()
            .kind(direct_message_kind())
            .pubkeys(self.registry.public_keys());

        if self.config.replay_history {
            filter
        } else {
            filter.since(Timestamp::now())
        }
    }

    /// Runs the bridge until `shutdown` resolves or the relay stream ends.
    ///
    /// `shutdown` is polled from the start, so a signal that arrives while
    /// the relay is still connecting stops the bridge cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay connection or subscription fails at
    /// startup. Per-message failures never surface here.
    pub async fn run<F>(&self, shutdown: F) -> Result<DispatchStats, SupervisorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tokio::select! {
            connected = self.transport.connect() => connected?,
            () = &mut shutdown => {
                info!("shutdown requested before the relay connected");
                self.transport.close().await;
                return Ok(DispatchStats::default());
            }
        }

        let events = match self.transport.subscribe(self.subscription_filter()).await {
            Ok(events) => events,
            Err(e) => {
                self.transport.close().await;
                return Err(e.into());
            }
        };

        info!(
            relay = %self.config.relay_url,
            assistants = self.registry.len(),
            "bridge listening for direct messages"
        );

        let bridge = Bridge::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.backend),
            Arc::clone(&self.transport),
        );
        let stats = Dispatcher::new(bridge).run(events, &mut shutdown).await;

        self.transport.close().await;
        info!(
            dispatched = stats.dispatched,
            replied = stats.replied,
            dropped = stats.dropped,
            "bridge stopped"
        );

        Ok(stats)
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
