//! SHA3-256 checksums and SHAKE-256 expansion used by every encoded seed and
//! account number.

use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Digest, Sha3_256, Shake256};

/// Length of the truncated checksum appended to encoded payloads
pub const CHECKSUM_LENGTH: usize = 4;

/// First [`CHECKSUM_LENGTH`] bytes of SHA3-256 over `data`
#[must_use]
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha3_256::digest(data);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[..CHECKSUM_LENGTH]);
    out
}

/// SHAKE-256 with `data` absorbed `repeat` times, squeezed to `out_len` bytes.
///
/// Key material for compact seeds is the core absorbed four times.
#[must_use]
pub fn shake(data: &[u8], repeat: usize, out_len: usize) -> Vec<u8> {
    let mut xof = Shake256::default();
    for _ in 0..repeat {
        Update::update(&mut xof, data);
    }
    let mut out = vec![0u8; out_len];
    xof.finalize_xof().read(&mut out);
    out
}

/// Decode hex, left-padding odd-length input with a single `0`.
///
/// # Errors
/// Returns error on non-hex characters
pub fn decode_hex(s: &str) -> Result<Vec<u8>, super::CryptoError> {
    let padded;
    let input = if s.len() % 2 == 1 {
        padded = format!("0{s}");
        padded.as_str()
    } else {
        s
    };
    hex::decode(input).map_err(|e| super::CryptoError::InvalidHex(e.to_string()))
}
