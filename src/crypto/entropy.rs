//! Sources of secure random bytes for new seeds.

use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::config::Network;

/// Random bytes drawn for a compact core before the network flag is applied
pub const RANDOM_CORE_LENGTH: usize = 16;

/// Length of a compact core (16.5 bytes used, padded to 17)
pub const COMPACT_CORE_LENGTH: usize = 17;

/// Provider of cryptographically secure random bytes.
///
/// Implementations must be safe to share between threads; a context holds a
/// single boxed source for its lifetime.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` with random bytes
    fn fill_bytes(&self, dest: &mut [u8]);

    /// Allocate and fill a buffer of `len` random bytes
    fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.fill_bytes(&mut buf);
        buf
    }
}

/// Operating system CSPRNG
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Deterministic ChaCha20 stream, for reproducible fixtures and tests.
///
/// Never use this for real accounts.
pub struct SeededEntropy {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededEntropy {
    /// Create a stream from a 32-byte seed
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_seed(seed)),
        }
    }

    /// Create a stream from a small integer seed
    #[must_use]
    pub fn from_u64(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.fill_bytes(dest);
    }
}

impl std::fmt::Debug for SeededEntropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SeededEntropy(..)")
    }
}

/// Mode nibble derived from bits 7, 6, 5 and 4 of the first four bytes
#[must_use]
pub(crate) const fn mode_bits(core: &[u8; COMPACT_CORE_LENGTH]) -> u8 {
    (core[0] & 0x80) | (core[1] & 0x40) | (core[2] & 0x20) | (core[3] & 0x10)
}

/// Draw a network-flagged compact core.
///
/// Layout (bit 7 first):
///
/// ```text
/// bytes 0..15  random
/// byte  15     ffff3210   ffff = network flag, 3210 random
/// byte  16     7654xxxx   7654 = original high nibble of byte 15, xxxx = 0
/// ```
///
/// The flag is the mode nibble for the live network and its complement for
/// the test network.
#[must_use]
pub fn network_entropy(source: &dyn EntropySource, network: Network) -> [u8; COMPACT_CORE_LENGTH] {
    let mut core = [0u8; COMPACT_CORE_LENGTH];
    source.fill_bytes(&mut core[..RANDOM_CORE_LENGTH]);
    core[16] = core[15] & 0xF0;

    let mut mode = mode_bits(&core);
    if network == Network::TestNet {
        mode ^= 0xF0;
    }
    core[15] = mode | (core[15] & 0x0F);
    core
}
