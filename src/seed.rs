//! Seeds: versioned, network-tagged, checksummed account secrets.
//!
//! Encoded layout, before Base58:
//!
//! ```text
//! compact (12 words): 5A FE | 02 |           core[17] | checksum[4]   24 bytes
//! legacy  (24 words): 5A FE | 01 | network | core[32] | checksum[4]   40 bytes
//! ```
//!
//! The checksum is the first four bytes of SHA3-256 over everything before
//! it. Compact seeds have no network byte; the network is folded into the
//! core as a flag nibble (see [`crate::crypto::network_entropy`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::config::Network;
use crate::crypto::entropy::{mode_bits, COMPACT_CORE_LENGTH};
use crate::crypto::{
    checksum, network_entropy, seal_key_index, shake, CryptoError, EntropySource, CHECKSUM_LENGTH,
    KEY_INDEX_LENGTH,
};
use crate::mnemonic::{
    entropy_to_words, words_to_entropy, MnemonicError, PhraseLength, RecoveryPhrase,
};
use crate::wordlist::{Locale, WordLists};

/// Leading bytes of every encoded seed
pub const MAGIC_NUMBER: [u8; 2] = [0x5A, 0xFE];

/// Size of the explicit network byte in legacy seeds
pub const NETWORK_LENGTH: usize = 1;

/// Core size of legacy seeds
pub const LEGACY_CORE_LENGTH: usize = 32;

/// Times the compact core is absorbed when expanding key material
const KEY_MATERIAL_ROUNDS: usize = 4;

/// Bytes of key material per derived key
const KEY_MATERIAL_LENGTH: usize = 32;

/// Secretbox index of the legacy auth key; the encryption key uses the next one
const LEGACY_AUTH_INDEX: u128 = 0x03E7;

/// Seed container formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedFormat {
    /// 17-byte core, network folded in, 12-word phrase
    Compact,
    /// 32-byte core, explicit network byte, 24-word phrase
    Legacy,
}

impl SeedFormat {
    /// Version byte following the magic number
    #[must_use]
    pub const fn version(self) -> u8 {
        match self {
            Self::Compact => 0x02,
            Self::Legacy => 0x01,
        }
    }

    /// Size of the raw core
    #[must_use]
    pub const fn core_length(self) -> usize {
        match self {
            Self::Compact => COMPACT_CORE_LENGTH,
            Self::Legacy => LEGACY_CORE_LENGTH,
        }
    }

    /// Magic, version and (legacy only) network byte
    #[must_use]
    pub const fn header_length(self) -> usize {
        match self {
            Self::Compact => MAGIC_NUMBER.len() + 1,
            Self::Legacy => MAGIC_NUMBER.len() + 1 + NETWORK_LENGTH,
        }
    }

    /// Size of the decoded payload including checksum
    #[must_use]
    pub const fn payload_length(self) -> usize {
        self.header_length() + self.core_length() + CHECKSUM_LENGTH
    }

    /// Matching recovery phrase length
    #[must_use]
    pub const fn phrase_length(self) -> PhraseLength {
        match self {
            Self::Compact => PhraseLength::Twelve,
            Self::Legacy => PhraseLength::TwentyFour,
        }
    }

    const fn from_payload_length(len: usize) -> Option<Self> {
        if len == Self::Compact.payload_length() {
            Some(Self::Compact)
        } else if len == Self::Legacy.payload_length() {
            Some(Self::Legacy)
        } else {
            None
        }
    }
}

/// Seed errors
#[derive(Debug, Error)]
pub enum SeedError {
    /// Text is not valid Base58
    #[error("invalid seed encoding: {0}")]
    InvalidEncoding(String),
    /// Decoded payload matches no known format
    #[error("invalid encoded seed length {0}, expected 24 or 40 bytes")]
    InvalidLength(usize),
    /// Raw core has the wrong size for its format
    #[error("invalid {format:?} seed core: expected {expected} bytes, got {actual}")]
    InvalidCoreLength {
        /// Format being built
        format: SeedFormat,
        /// Required size
        expected: usize,
        /// Supplied size
        actual: usize,
    },
    /// Trailing checksum does not match the payload
    #[error(
        "invalid checksum: expected {}, found {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    InvalidChecksum {
        /// Checksum recomputed from the payload
        expected: [u8; CHECKSUM_LENGTH],
        /// Checksum carried by the seed
        actual: [u8; CHECKSUM_LENGTH],
    },
    /// Payload does not start with `5AFE`
    #[error(
        "invalid magic number: expected {}, found {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    InvalidMagicNumber {
        /// Required magic number
        expected: [u8; 2],
        /// Magic number found
        actual: [u8; 2],
    },
    /// Version byte does not match the format
    #[error("invalid seed version: expected {expected:#04x}, found {actual:#04x}")]
    InvalidVersion {
        /// Version implied by the payload length
        expected: u8,
        /// Version byte found
        actual: u8,
    },
    /// Network tag or flag is not a known network
    #[error("invalid network tag {0:#04x}")]
    InvalidNetwork(u8),
    /// Reserved low nibble of a compact core is not zero
    #[error("reserved bits set in seed core: {0:#04x}")]
    ReservedBits(u8),
    /// Key material could not be derived
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// Recovery phrase failure
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
}

/// Result type for seed operations
pub type SeedResult<T> = Result<T, SeedError>;

/// An account seed. Immutable once built.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Seed {
    format: SeedFormat,
    network: Network,
    core: Vec<u8>,
}

impl Seed {
    /// Generate a random compact seed for `network`
    #[must_use]
    pub fn generate(source: &dyn EntropySource, network: Network) -> Self {
        Self {
            format: SeedFormat::Compact,
            network,
            core: network_entropy(source, network).to_vec(),
        }
    }

    /// Generate a random legacy seed for `network`
    #[must_use]
    pub fn generate_legacy(source: &dyn EntropySource, network: Network) -> Self {
        Self {
            format: SeedFormat::Legacy,
            network,
            core: source.random_bytes(LEGACY_CORE_LENGTH),
        }
    }

    /// Build a compact seed from its 17-byte core.
    ///
    /// # Errors
    /// Returns error if the core has the wrong size, a non-zero reserved
    /// nibble, or a flag nibble that names no network
    pub fn from_core(core: &[u8]) -> SeedResult<Self> {
        let core: [u8; COMPACT_CORE_LENGTH] =
            core.try_into().map_err(|_| SeedError::InvalidCoreLength {
                format: SeedFormat::Compact,
                expected: COMPACT_CORE_LENGTH,
                actual: core.len(),
            })?;
        if core[16] & 0x0F != 0 {
            return Err(SeedError::ReservedBits(core[16]));
        }
        let network = compact_network(&core)?;
        Ok(Self {
            format: SeedFormat::Compact,
            network,
            core: core.to_vec(),
        })
    }

    /// Build a legacy seed from its 32-byte core.
    ///
    /// # Errors
    /// Returns error if the core has the wrong size
    pub fn from_legacy_core(core: &[u8], network: Network) -> SeedResult<Self> {
        if core.len() != LEGACY_CORE_LENGTH {
            return Err(SeedError::InvalidCoreLength {
                format: SeedFormat::Legacy,
                expected: LEGACY_CORE_LENGTH,
                actual: core.len(),
            });
        }
        Ok(Self {
            format: SeedFormat::Legacy,
            network,
            core: core.to_vec(),
        })
    }

    /// Container format
    #[must_use]
    pub const fn format(&self) -> SeedFormat {
        self.format
    }

    /// Network the seed belongs to
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    /// Format version byte
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.format.version()
    }

    /// Raw core bytes
    ///
    /// # Security
    /// This is the account secret.
    #[must_use]
    pub fn core(&self) -> &[u8] {
        &self.core
    }

    /// Binary payload: header, core and checksum
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.format.payload_length());
        payload.extend_from_slice(&MAGIC_NUMBER);
        payload.push(self.format.version());
        if self.format == SeedFormat::Legacy {
            payload.push(self.network.value());
        }
        payload.extend_from_slice(&self.core);
        let sum = checksum(&payload);
        payload.extend_from_slice(&sum);
        payload
    }

    /// Base58 text form
    #[must_use]
    pub fn encode(&self) -> String {
        bs58::encode(self.to_payload()).into_string()
    }

    /// Parse the Base58 text form.
    ///
    /// Checks run in order: payload length, checksum, magic number, version,
    /// then reserved bits and network. Nothing is returned unless every
    /// check passes.
    ///
    /// # Errors
    /// Returns the first failed check. A compact core whose low nibble of
    /// the last byte is not zero fails with `ReservedBits`.
    pub fn decode(text: &str) -> SeedResult<Self> {
        let payload = bs58::decode(text)
            .into_vec()
            .map_err(|e| SeedError::InvalidEncoding(e.to_string()))?;
        let seed = Self::from_payload(&payload)?;
        debug!(format = ?seed.format, network = %seed.network, "Decoded seed");
        Ok(seed)
    }

    /// Validate and unpack a binary payload.
    ///
    /// # Errors
    /// See [`Seed::decode`]
    pub fn from_payload(payload: &[u8]) -> SeedResult<Self> {
        let format =
            SeedFormat::from_payload_length(payload.len()).ok_or(SeedError::InvalidLength(payload.len()))?;

        let (data, trailer) = payload.split_at(payload.len() - CHECKSUM_LENGTH);
        let expected = checksum(data);
        if trailer != expected {
            let mut actual = [0u8; CHECKSUM_LENGTH];
            actual.copy_from_slice(trailer);
            return Err(SeedError::InvalidChecksum { expected, actual });
        }

        let magic = [data[0], data[1]];
        if magic != MAGIC_NUMBER {
            return Err(SeedError::InvalidMagicNumber {
                expected: MAGIC_NUMBER,
                actual: magic,
            });
        }

        let version = data[MAGIC_NUMBER.len()];
        if version != format.version() {
            return Err(SeedError::InvalidVersion {
                expected: format.version(),
                actual: version,
            });
        }

        let core = &data[format.header_length()..];
        match format {
            SeedFormat::Compact => Self::from_core(core),
            SeedFormat::Legacy => {
                let tag = data[MAGIC_NUMBER.len() + 1];
                let network = Network::from_value(tag).ok_or(SeedError::InvalidNetwork(tag))?;
                Self::from_legacy_core(core, network)
            }
        }
    }

    /// Render the seed as a recovery phrase in `locale`
    ///
    /// # Errors
    /// Returns error if the word table cannot be loaded
    pub fn to_mnemonic(&self, wordlists: &WordLists, locale: Locale) -> SeedResult<RecoveryPhrase> {
        let phrase = match self.format {
            SeedFormat::Compact => entropy_to_words(wordlists, &self.core, locale)?,
            SeedFormat::Legacy => {
                let mut entropy = Vec::with_capacity(NETWORK_LENGTH + LEGACY_CORE_LENGTH);
                entropy.push(self.network.value());
                entropy.extend_from_slice(&self.core);
                entropy_to_words(wordlists, &entropy, locale)?
            }
        };
        Ok(phrase)
    }

    /// Recover a seed from a validated phrase
    ///
    /// # Errors
    /// Returns error if the recovered core is not a valid seed
    pub fn from_mnemonic(wordlists: &WordLists, phrase: &RecoveryPhrase) -> SeedResult<Self> {
        Self::from_words(wordlists, phrase.words())
    }

    /// Recover a seed from 12 or 24 words
    ///
    /// # Errors
    /// Returns mnemonic errors for bad words, or seed errors if the recovered
    /// core carries no valid network
    pub fn from_words<S: AsRef<str>>(wordlists: &WordLists, words: &[S]) -> SeedResult<Self> {
        let (entropy, _) = words_to_entropy(wordlists, words)?;
        match PhraseLength::from_entropy_length(entropy.len()) {
            Some(PhraseLength::Twelve) => Self::from_core(&entropy),
            Some(PhraseLength::TwentyFour) => {
                let network =
                    Network::from_value(entropy[0]).ok_or(SeedError::InvalidNetwork(entropy[0]))?;
                Self::from_legacy_core(&entropy[NETWORK_LENGTH..], network)
            }
            None => Err(MnemonicError::InvalidEntropyLength(entropy.len()).into()),
        }
    }

    /// Private key material for the account's signing key
    ///
    /// # Errors
    /// Returns `Crypto` if the legacy secretbox step fails
    pub fn auth_key_material(&self) -> SeedResult<[u8; KEY_MATERIAL_LENGTH]> {
        self.key_material(0)
    }

    /// Private key material for the account's encryption key
    ///
    /// # Errors
    /// Returns `Crypto` if the legacy secretbox step fails
    pub fn encryption_key_material(&self) -> SeedResult<[u8; KEY_MATERIAL_LENGTH]> {
        self.key_material(1)
    }

    fn key_material(&self, slot: usize) -> SeedResult<[u8; KEY_MATERIAL_LENGTH]> {
        if self.format == SeedFormat::Legacy {
            return self.legacy_key_material(slot);
        }
        let expanded = shake(&self.core, KEY_MATERIAL_ROUNDS, KEY_MATERIAL_LENGTH * (slot + 1));
        let mut out = [0u8; KEY_MATERIAL_LENGTH];
        out.copy_from_slice(&expanded[KEY_MATERIAL_LENGTH * slot..]);
        Ok(out)
    }

    // Legacy keys seal a big-endian index under the core with a zero nonce.
    fn legacy_key_material(&self, slot: usize) -> SeedResult<[u8; KEY_MATERIAL_LENGTH]> {
        let key: [u8; LEGACY_CORE_LENGTH] =
            self.core.as_slice().try_into().map_err(|_| SeedError::InvalidCoreLength {
                format: SeedFormat::Legacy,
                expected: LEGACY_CORE_LENGTH,
                actual: self.core.len(),
            })?;
        let index: [u8; KEY_INDEX_LENGTH] = (LEGACY_AUTH_INDEX + slot as u128).to_be_bytes();
        Ok(seal_key_index(&key, &index)?)
    }
}

fn compact_network(core: &[u8; COMPACT_CORE_LENGTH]) -> SeedResult<Network> {
    let mode = mode_bits(core);
    let flag = core[15] & 0xF0;
    if flag == mode {
        Ok(Network::LiveNet)
    } else if flag == mode ^ 0xF0 {
        Ok(Network::TestNet)
    } else {
        Err(SeedError::InvalidNetwork(flag))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("format", &self.format)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl FromStr for Seed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
