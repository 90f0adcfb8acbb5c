//! Public keys and the key-derivation capability borrowed from the signing
//! subsystem.
//!
//! Signing and verification live outside this crate. Seeds only need one
//! thing from that side: turning 32 bytes of key material into a public key,
//! which is what [`KeyDeriver`] expresses.

use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CryptoError, CryptoResult};

/// Length of an Ed25519 public key
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// A 32-byte Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Create from raw bytes
    ///
    /// # Errors
    /// Returns error if bytes don't represent a valid curve point
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> CryptoResult<Self> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Wrap bytes without curve validation
    #[must_use]
    pub const fn from_bytes_unchecked(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get underlying bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Derives a public key from 32 bytes of seed key material.
pub trait KeyDeriver: Send + Sync {
    /// Public key for the given private key material
    fn derive_public_key(&self, material: &[u8; 32]) -> PublicKey;
}

/// Ed25519 key derivation backed by `ed25519-dalek`
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Deriver;

impl KeyDeriver for Ed25519Deriver {
    fn derive_public_key(&self, material: &[u8; 32]) -> PublicKey {
        let signing = SigningKey::from_bytes(material);
        PublicKey::from_bytes_unchecked(signing.verifying_key().to_bytes())
    }
}
