//! Assistant identity keypairs.
//!
//! Each configured assistant owns a long-lived Nostr keypair: the public key
//! is the address senders tag in their direct messages, the secret key
//! derives the NIP-44 conversation key and signs reply events.
//!
//! # Security
//!
//! - Secret bytes are automatically zeroized on drop via [`ZeroizeOnDrop`]
//! - Temporary copies are manually zeroized after use
//! - Debug output never includes secret material

use nostr::{Keys, PublicKey, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::nostr::encryption::{derive_shared_secret, SharedSecret};
use crate::nostr::error::{NostrError, Result};

/// A persistent assistant keypair.
///
/// # Example
///
/// ```
/// use assistant_bridge::nostr::AssistantKeys;
///
/// let keys = AssistantKeys::generate();
/// assert_eq!(keys.pubkey_hex().len(), 64);
/// ```
#[derive(ZeroizeOnDrop)]
pub struct AssistantKeys {
    /// The secret key bytes (zeroized on drop).
    secret_bytes: [u8; 32],

    /// Cached public key (not sensitive, skip zeroization).
    #[zeroize(skip)]
    public_key: PublicKey,
}

impl AssistantKeys {
    /// Generates a new random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let keys = Keys::generate();
        Self {
            secret_bytes: keys.secret_key().secret_bytes(),
            public_key: keys.public_key(),
        }
    }

    /// Parses a secret key given as 64-char hex or NIP-19 `nsec1…`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidKey`] if the input is not a valid
    /// secp256k1 secret key.
    pub fn parse(secret: &str) -> Result<Self> {
        let keys = Keys::parse(secret.trim()).map_err(|e| NostrError::InvalidKey(e.to_string()))?;
        Ok(Self {
            secret_bytes: keys.secret_key().secret_bytes(),
            public_key: keys.public_key(),
        })
    }

    /// Creates a keypair from raw secret key bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes don't represent a valid secret key.
    pub fn from_secret_bytes(secret_bytes: [u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| NostrError::InvalidKey(e.to_string()))?;
        let public_key = Keys::new(secret_key).public_key();

        Ok(Self {
            secret_bytes,
            public_key,
        })
    }

    /// Returns the assistant's public key.
    #[must_use]
    pub const fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Returns the public key as a 64-character hex string.
    #[must_use]
    pub fn pubkey_hex(&self) -> String {
        self.public_key.to_hex()
    }

    /// Derives the shared secret between this assistant and `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidKey`] if the derivation fails.
    pub fn shared_secret(&self, peer: &PublicKey) -> Result<SharedSecret> {
        let mut secret_bytes_copy = self.secret_bytes;

        let result = SecretKey::from_slice(&secret_bytes_copy)
            .map_err(|e| NostrError::InvalidKey(e.to_string()))
            .and_then(|secret_key| derive_shared_secret(&secret_key, peer));

        secret_bytes_copy.zeroize();

        result
    }

    /// Reconstructs signing keys for an immediate signing operation.
    ///
    /// The returned [`Keys`] holds secret material that is not zeroized on
    /// drop; do not store it.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored bytes no longer form a valid key.
    pub(crate) fn signing_keys(&self) -> Result<Keys> {
        let mut secret_bytes_copy = self.secret_bytes;

        let result = SecretKey::from_slice(&secret_bytes_copy)
            .map(Keys::new)
            .map_err(|e| NostrError::Signing(e.to_string()));

        secret_bytes_copy.zeroize();

        result
    }
}

impl std::fmt::Debug for AssistantKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret key
        f.debug_struct("AssistantKeys")
            .field("pubkey", &self.pubkey_hex())
            .finish()
    }
}
