//! Bridge configuration structure.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use nostr::PublicKey;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::nostr::AssistantKeys;

/// Environment variable that replaces `relayUrl` after the file is loaded.
pub const ENV_RELAY_URL: &str = "BRIDGE_RELAY_URL";

/// Default bound on a single assistant backend call.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 60;

/// Default bound on the initial relay connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

const fn default_backend_timeout_secs() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Static configuration, loaded once at startup and never mutated after.
///
/// ```json
/// {
///   "relayUrl": "wss://relay.example.com",
///   "assistants": [
///     { "pubkey": "<hex>", "privatekey": "<hex>", "assistantUrl": "http://localhost:8000/ask" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Relay the bridge connects to.
    pub relay_url: String,

    /// Assistants reachable through the bridge, unique by public key.
    pub assistants: Vec<AssistantEntry>,

    /// Upper bound for one assistant backend call, in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Upper bound for the startup relay connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Also answer direct messages the relay stored before startup.
    #[serde(default)]
    pub replay_history: bool,
}

/// One configured assistant.
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantEntry {
    /// Public key, hex or `npub1…`.
    pub pubkey: String,

    /// Secret key, hex or `nsec1…`.
    pub privatekey: String,

    /// HTTP endpoint the decrypted messages are forwarded to.
    #[serde(rename = "assistantUrl")]
    pub assistant_url: String,
}

impl std::fmt::Debug for AssistantEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret key
        f.debug_struct("AssistantEntry")
            .field("pubkey", &self.pubkey)
            .field("assistant_url", &self.assistant_url)
            .finish_non_exhaustive()
    }
}

impl AssistantEntry {
    /// Parses the declared public key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] if it is not a valid public key.
    pub fn public_key(&self) -> ConfigResult<PublicKey> {
        PublicKey::parse(self.pubkey.trim()).map_err(|e| ConfigError::InvalidKey {
            pubkey: self.pubkey.clone(),
            reason: e.to_string(),
        })
    }

    /// Parses the secret key and checks it derives the declared public key.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidKey`] if either key does not parse
    /// - [`ConfigError::KeyMismatch`] if the keys do not belong together
    pub fn keys(&self) -> ConfigResult<AssistantKeys> {
        let declared = self.public_key()?;
        let keys = AssistantKeys::parse(&self.privatekey).map_err(|e| ConfigError::InvalidKey {
            pubkey: self.pubkey.clone(),
            reason: e.to_string(),
        })?;

        if keys.public_key() != declared {
            return Err(ConfigError::KeyMismatch(self.pubkey.clone()));
        }

        Ok(keys)
    }

    /// Parses the assistant endpoint; only http and https are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for malformed or non-HTTP URLs.
    pub fn endpoint(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.assistant_url).map_err(|e| {
            ConfigError::Validation(format!(
                "assistantUrl {} for {}: {e}",
                self.assistant_url, self.pubkey
            ))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Validation(format!(
                "assistantUrl {} for {} must be http(s), got {scheme}",
                self.assistant_url, self.pubkey
            ))),
        }
    }
}

impl BridgeConfig {
    /// Loads, overrides from the environment, and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {e}", path.display())))?;

        let mut config = Self::from_json(&content)?;
        config.apply_overrides(std::env::var(ENV_RELAY_URL).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses configuration JSON without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the JSON does not match.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replaces the relay URL when an override is present and non-empty.
    pub fn apply_overrides(&mut self, relay_url: Option<String>) {
        if let Some(url) = relay_url.filter(|url| !url.trim().is_empty()) {
            self.relay_url = url;
        }
    }

    /// Checks every field the bridge relies on.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        let relay_url = self.relay_url.trim();
        if relay_url.is_empty() {
            return Err(ConfigError::Validation("relayUrl is empty".to_string()));
        }
        if !(relay_url.starts_with("wss://") || relay_url.starts_with("ws://")) {
            return Err(ConfigError::Validation(format!(
                "relayUrl must be ws:// or wss://, got {relay_url}"
            )));
        }
        if self.assistants.is_empty() {
            return Err(ConfigError::Validation(
                "at least one assistant must be configured".to_string(),
            ));
        }
        if self.backend_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backendTimeoutSecs must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "connectTimeoutSecs must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(self.assistants.len());
        for entry in &self.assistants {
            let keys = entry.keys()?;
            entry.endpoint()?;
            if !seen.insert(keys.public_key()) {
                return Err(ConfigError::DuplicateAssistant(entry.pubkey.clone()));
            }
        }

        Ok(())
    }

    /// Backend call timeout.
    #[must_use]
    pub const fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Startup connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
