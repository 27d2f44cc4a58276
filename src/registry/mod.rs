//! Assistant registry.
//!
//! Maps an assistant's public key to its keys and forwarding endpoint.
//! Built once from [`BridgeConfig`] and read-only afterwards, so it is
//! shared across concurrent message handlers behind an `Arc` without
//! locking.

use std::collections::HashMap;

use nostr::PublicKey;
use reqwest::Url;

use crate::config::{BridgeConfig, ConfigError, ConfigResult};
use crate::nostr::AssistantKeys;

/// A configured assistant.
#[derive(Debug)]
pub struct Assistant {
    /// The assistant's keypair.
    pub keys: AssistantKeys,

    /// Endpoint decrypted messages are forwarded to.
    pub endpoint: Url,
}

impl Assistant {
    /// Returns the assistant's public key.
    #[must_use]
    pub const fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }
}

/// Read-only lookup from public key to [`Assistant`].
#[derive(Debug, Default)]
pub struct AssistantRegistry {
    assistants: HashMap<PublicKey, Assistant>,
}

impl AssistantRegistry {
    /// Builds the registry from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has bad keys or endpoint, or if two
    /// entries share a public key.
    pub fn from_config(config: &BridgeConfig) -> ConfigResult<Self> {
        let mut registry = Self::default();

        for entry in &config.assistants {
            let assistant = Assistant {
                keys: entry.keys()?,
                endpoint: entry.endpoint()?,
            };
            registry.insert(assistant).map_err(|assistant| {
                ConfigError::DuplicateAssistant(assistant.keys.pubkey_hex())
            })?;
        }

        Ok(registry)
    }

    /// Adds an assistant, handing it back if its key is already taken.
    ///
    /// # Errors
    ///
    /// Returns the rejected assistant when the public key is a duplicate.
    pub fn insert(&mut self, assistant: Assistant) -> Result<(), Assistant> {
        let key = assistant.public_key();
        if self.assistants.contains_key(&key) {
            return Err(assistant);
        }
        self.assistants.insert(key, assistant);
        Ok(())
    }

    /// Exact-match lookup.
    #[must_use]
    pub fn resolve(&self, public_key: &PublicKey) -> Option<&Assistant> {
        self.assistants.get(public_key)
    }

    /// Looks up the raw value of a `p` tag.
    ///
    /// Values that do not parse as a public key resolve to nothing.
    #[must_use]
    pub fn resolve_tag(&self, value: &str) -> Option<&Assistant> {
        PublicKey::parse(value)
            .ok()
            .and_then(|public_key| self.resolve(&public_key))
    }

    /// Whether `public_key` belongs to a configured assistant.
    #[must_use]
    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.assistants.contains_key(public_key)
    }

    /// Public keys of all configured assistants.
    #[must_use]
    pub fn public_keys(&self) -> Vec<PublicKey> {
        self.assistants.keys().copied().collect()
    }

    /// Number of configured assistants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assistants.len()
    }

    /// Whether no assistant is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assistants.is_empty()
    }
}
