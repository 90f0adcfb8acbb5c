//! Cryptographic building blocks for seeds and account numbers.
//!
//! - SHA3-256 for checksums, SHAKE-256 for compact key material
//! - XSalsa20-Poly1305 secretbox for legacy key material
//! - OS or ChaCha20 entropy sources
//! - ed25519-dalek behind the [`KeyDeriver`] capability

pub mod entropy;
mod hash;
mod keys;
mod secretbox;

pub use entropy::{network_entropy, EntropySource, OsEntropy, SeededEntropy};
pub use hash::{checksum, decode_hex, shake, CHECKSUM_LENGTH};
pub use keys::{Ed25519Deriver, KeyDeriver, PublicKey, PUBLIC_KEY_LENGTH};
pub use secretbox::{seal_key_index, BOXED_LENGTH, KEY_INDEX_LENGTH};

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid public key format
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// Invalid hex input
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Key material could not be derived
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
