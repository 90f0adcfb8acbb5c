//! NaCl secretbox used as a key-derivation step for legacy seeds.
//!
//! A 16-byte key index is sealed under the 32-byte seed core with an
//! all-zero nonce. The boxed output (tag, then ciphertext) is the key
//! material.

use xsalsa20poly1305::aead::{AeadInPlace, KeyInit};
use xsalsa20poly1305::{Key, Nonce, XSalsa20Poly1305};

use super::{CryptoError, CryptoResult};

/// Length of a key index
pub const KEY_INDEX_LENGTH: usize = 16;

/// Length of the derived material: Poly1305 tag plus sealed index
pub const BOXED_LENGTH: usize = 32;

/// Seal `index` under `key` with a zero nonce, returning `tag || ciphertext`
///
/// # Errors
/// Returns `KeyDerivation` if the cipher rejects the input
pub fn seal_key_index(key: &[u8; 32], index: &[u8; KEY_INDEX_LENGTH]) -> CryptoResult<[u8; BOXED_LENGTH]> {
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key));
    let mut sealed = *index;
    let tag = cipher
        .encrypt_in_place_detached(&Nonce::default(), b"", &mut sealed)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut out = [0u8; BOXED_LENGTH];
    out[..tag.len()].copy_from_slice(&tag);
    out[tag.len()..].copy_from_slice(&sealed);
    Ok(out)
}
