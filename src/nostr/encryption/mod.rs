//! NIP-44 v2 encryption channel between an assistant and a sender.
//!
//! The conversation key is derived by ECDH between one party's secret key
//! and the other party's public key, so both directions of a direct message
//! exchange share the same [`SharedSecret`].

use base64::Engine;
use nostr::nips::nip44::v2::{self, ConversationKey};
use nostr::{PublicKey, SecretKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::nostr::error::{NostrError, Result};

/// A NIP-44 v2 conversation key.
///
/// The bytes are held in a `Zeroizing` buffer and wiped on drop.
///
/// # Known Gap
///
/// `ConversationKey` from the `nostr` crate does **not** implement
/// `Zeroize`, so the short-lived copy built for each seal/open is not
/// scrubbed.
#[derive(Clone)]
pub struct SharedSecret {
    bytes: Zeroizing<[u8; 32]>,
}

impl SharedSecret {
    /// Wraps raw conversation key bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(*self.bytes)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_slice().ct_eq(other.bytes.as_slice()).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Derives the shared secret between `secret_key` and `peer`.
///
/// Deriving from either side of the exchange yields the same secret.
///
/// # Errors
///
/// Returns [`NostrError::InvalidKey`] if the keys cannot be combined.
pub fn derive_shared_secret(secret_key: &SecretKey, peer: &PublicKey) -> Result<SharedSecret> {
    let conversation_key = ConversationKey::derive(secret_key, peer)
        .map_err(|e| NostrError::InvalidKey(e.to_string()))?;

    let mut bytes = Zeroizing::new([0u8; 32]);
    bytes.copy_from_slice(conversation_key.as_bytes());

    Ok(SharedSecret { bytes })
}

/// Encrypts `plaintext` with NIP-44 v2 and returns the base64 payload.
///
/// A fresh random nonce is used on every call.
///
/// # Errors
///
/// Returns [`NostrError::Encryption`] if encryption fails. NIP-44 rejects
/// empty plaintexts.
pub fn seal(secret: &SharedSecret, plaintext: &str) -> Result<String> {
    let conversation_key = secret.conversation_key();
    let encrypted_bytes = v2::encrypt_to_bytes(&conversation_key, plaintext.as_bytes())
        .map_err(|e| NostrError::Encryption(e.to_string()))?;

    Ok(base64::engine::general_purpose::STANDARD.encode(encrypted_bytes))
}

/// Decrypts a base64 NIP-44 v2 payload.
///
/// # Errors
///
/// Returns [`NostrError::Decryption`] if the payload is not base64, fails
/// authentication or is not valid UTF-8.
pub fn open(secret: &SharedSecret, ciphertext: &str) -> Result<String> {
    let conversation_key = secret.conversation_key();

    let encrypted_bytes = base64::engine::general_purpose::STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| NostrError::Decryption(format!("Base64 decode error: {e}")))?;

    let decrypted_bytes = v2::decrypt_to_bytes(&conversation_key, &encrypted_bytes)
        .map_err(|e| NostrError::Decryption(e.to_string()))?;

    String::from_utf8(decrypted_bytes)
        .map_err(|e| NostrError::Decryption(format!("UTF-8 decode error: {e}")))
}
