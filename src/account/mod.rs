//! Accounts and their public account numbers.
//!
//! An account number is Base58 of:
//!
//! ```text
//! varint(key variant) | ed25519 public key[32] | checksum[4]
//! ```
//!
//! where the key variant packs the key type (bits 4..7), the network
//! (bit 1) and the key part (bit 0, always public here).

mod varint;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::Network;
use crate::crypto::{checksum, CryptoError, KeyDeriver, PublicKey, CHECKSUM_LENGTH, PUBLIC_KEY_LENGTH};
use crate::mnemonic::RecoveryPhrase;
use crate::seed::{Seed, SeedError};
use crate::wordlist::{Locale, WordLists};

/// Key type tag for Ed25519
const ED25519_KEY_TYPE: u64 = 0x01;

/// Key part tag for public keys
const PUBLIC_KEY_PART: u64 = 0x01;

/// Account errors
#[derive(Debug, Error)]
pub enum AccountError {
    /// Text is not valid Base58 or the key variant is truncated
    #[error("invalid account number encoding: {0}")]
    InvalidEncoding(String),
    /// Decoded length disagrees with the key variant
    #[error("invalid account number length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Length implied by the key variant
        expected: usize,
        /// Decoded length
        actual: usize,
    },
    /// Trailing checksum does not match
    #[error(
        "invalid account number checksum: expected {}, found {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    InvalidChecksum {
        /// Checksum recomputed from the payload
        expected: [u8; CHECKSUM_LENGTH],
        /// Checksum carried by the account number
        actual: [u8; CHECKSUM_LENGTH],
    },
    /// Key variant names a private key
    #[error("account number does not hold a public key (variant {0:#x})")]
    NotPublicKey(u64),
    /// Key variant names an unsupported key algorithm
    #[error("unsupported key type {0:#x}")]
    UnsupportedKeyType(u64),
    /// Public key bytes are not a valid curve point
    #[error(transparent)]
    InvalidPublicKey(#[from] CryptoError),
    /// Seed could not be used
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Result type for account operations
pub type AccountResult<T> = Result<T, AccountError>;

/// A network-tagged public account identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountNumber {
    public_key: PublicKey,
    network: Network,
}

impl AccountNumber {
    /// Account number for an Ed25519 public key
    #[must_use]
    pub const fn new(public_key: PublicKey, network: Network) -> Self {
        Self { public_key, network }
    }

    /// Public key
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Network
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    fn key_variant(&self) -> u64 {
        (ED25519_KEY_TYPE << 4) | (u64::from(self.network.value()) << 1) | PUBLIC_KEY_PART
    }

    /// Key variant prefix followed by the public key
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut packed = varint::encode(self.key_variant());
        packed.extend_from_slice(self.public_key.as_bytes());
        packed
    }

    /// Base58 text form
    #[must_use]
    pub fn encode(&self) -> String {
        let mut bytes = self.pack();
        let sum = checksum(&bytes);
        bytes.extend_from_slice(&sum);
        bs58::encode(bytes).into_string()
    }

    /// Parse and validate the Base58 text form
    ///
    /// # Errors
    /// Returns the first failed check: encoding, length, checksum, key part,
    /// key type, public key
    pub fn parse(text: &str) -> AccountResult<Self> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| AccountError::InvalidEncoding(e.to_string()))?;
        let (variant, prefix_len) = varint::decode(&bytes)
            .ok_or_else(|| AccountError::InvalidEncoding("truncated key variant".to_string()))?;

        let expected = prefix_len + PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH;
        if bytes.len() != expected {
            return Err(AccountError::InvalidLength {
                expected,
                actual: bytes.len(),
            });
        }

        let (body, trailer) = bytes.split_at(expected - CHECKSUM_LENGTH);
        let sum = checksum(body);
        if trailer != sum {
            let mut actual = [0u8; CHECKSUM_LENGTH];
            actual.copy_from_slice(trailer);
            return Err(AccountError::InvalidChecksum { expected: sum, actual });
        }

        if variant & 0x01 != PUBLIC_KEY_PART {
            return Err(AccountError::NotPublicKey(variant));
        }
        let key_type = (variant >> 4) & 0x07;
        if key_type != ED25519_KEY_TYPE {
            return Err(AccountError::UnsupportedKeyType(key_type));
        }
        let network = if (variant >> 1) & 0x01 == 0 {
            Network::LiveNet
        } else {
            Network::TestNet
        };

        let mut key = [0u8; PUBLIC_KEY_LENGTH];
        key.copy_from_slice(&body[prefix_len..]);
        Ok(Self::new(PublicKey::from_bytes(key)?, network))
    }

    /// Whether `text` parses as an account number
    #[must_use]
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountNumber({})", self.encode())
    }
}

impl FromStr for AccountNumber {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for AccountNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A seed together with the account it controls
#[derive(Clone)]
pub struct Account {
    seed: Seed,
    account_number: AccountNumber,
}

impl Account {
    /// Derive the account controlled by `seed`
    ///
    /// # Errors
    /// Returns error for seeds without key derivation (legacy format)
    pub fn from_seed(seed: Seed, deriver: &dyn KeyDeriver) -> AccountResult<Self> {
        let material = seed.auth_key_material()?;
        let public_key = deriver.derive_public_key(&material);
        let account_number = AccountNumber::new(public_key, seed.network());
        Ok(Self {
            seed,
            account_number,
        })
    }

    /// Derive an account from an encoded seed string
    ///
    /// # Errors
    /// Returns error if the seed does not decode or cannot derive keys
    pub fn from_encoded_seed(text: &str, deriver: &dyn KeyDeriver) -> AccountResult<Self> {
        Self::from_seed(Seed::decode(text)?, deriver)
    }

    /// Derive an account from recovery words
    ///
    /// # Errors
    /// Returns error if the words are not a valid phrase or the recovered
    /// seed cannot derive keys
    pub fn from_recovery_phrase<S: AsRef<str>>(
        wordlists: &WordLists,
        words: &[S],
        deriver: &dyn KeyDeriver,
    ) -> AccountResult<Self> {
        Self::from_seed(Seed::from_words(wordlists, words)?, deriver)
    }

    /// The controlling seed
    #[must_use]
    pub const fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Public account number
    #[must_use]
    pub const fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    /// Signing public key
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        self.account_number.public_key()
    }

    /// Network
    #[must_use]
    pub const fn network(&self) -> Network {
        self.account_number.network()
    }

    /// Recovery phrase for the controlling seed
    ///
    /// # Errors
    /// Returns error if the word table cannot be loaded
    pub fn recovery_phrase(&self, wordlists: &WordLists, locale: Locale) -> AccountResult<RecoveryPhrase> {
        Ok(self.seed.to_mnemonic(wordlists, locale)?)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_number", &self.account_number)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519Deriver, SeededEntropy};
    use crate::seed::SeedFormat;
    use proptest::prelude::*;

    #[test]
    fn test_account_from_seed_vectors() {
        let cases = [
            (
                "9J87CAsHdFdoEu6N1unZk3sqhVBkVL8Z8",
                "369f6ceb1c23dbccc61b75e7990d0b2db8e1ee8da1c44db32280e63ca5804f38",
                "eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYVCb",
                Network::TestNet,
            ),
            (
                "9J873rncTvqwyHRmc98o78FYzhVWj3kS3",
                "2d4633f4b3cb972e6ccc5a50b139f21c176acd522c673374c76939cdb4eb180a",
                "aPbUArWcshmRP49i4zPcG4xEDsRDXmzpxpdSHYYx7xejmyAyA4",
                Network::LiveNet,
            ),
            (
                "9J876mP7wDJ6g5P41eNMN8N3jo9fycDs2",
                "d1c177ef358e9d1f0d4b09328cc1213e8d3580703aee51ccf97e482be977f7bc",
                "fXXHGtCdFPuQvNhJ4nDPKCdwPxH7aSZ4842n2katZi319NsaCs",
                Network::TestNet,
            ),
            (
                "9J877LVjhr3Xxd2nGzRVRVNUZpSKJF4TH",
                "9bdf52f23deb941ea23cec982c24a5c811d321e71f6df56508bd511f66311e06",
                "f7nuKToBByL3jEcArZWoB9PJ8MVmGPjrYkW88v3Yw8p7G5Sxhy",
                Network::TestNet,
            ),
        ];
        for (seed, public_key, number, network) in cases {
            let account = Account::from_encoded_seed(seed, &Ed25519Deriver).unwrap();
            assert_eq!(account.public_key().to_hex(), public_key);
            assert_eq!(account.account_number().encode(), number);
            assert_eq!(account.network(), network);
        }
    }

    #[test]
    fn test_account_from_phrase() {
        let lists = WordLists::default();
        let words: Vec<&str> =
            "during kingdom crew atom practice brisk weird document eager artwork ride then"
                .split(' ')
                .collect();
        let account = Account::from_recovery_phrase(&lists, &words, &Ed25519Deriver).unwrap();
        assert_eq!(
            account.account_number().to_string(),
            "f7nuKToBByL3jEcArZWoB9PJ8MVmGPjrYkW88v3Yw8p7G5Sxhy"
        );
        assert_eq!(
            account.recovery_phrase(&lists, Locale::English).unwrap().words(),
            words.as_slice()
        );
    }

    #[test]
    fn test_legacy_account_vectors() {
        let cases = [
            (
                "5XEECt18HGBGNET1PpxLhy5CsCLG9jnmM6Q8QGF4U2yGb1DABXZsVeD",
                "58760a01edf5ed4f95bfe977d77a27627cd57a25df5dea885972212c2b1c0e2f",
                "ec6yMcJATX6gjNwvqp8rbc4jNEasoUgbfBBGGyV5NvoJ54NXva",
            ),
            (
                "5XEECsXPYA9wDVXMtRMAVrtaWx7WSc5tG2hqj6b8iiz9rARjg2BgA9w",
                "807f4d123c944e0c3ecc95d9bde89916ced6341a8c8cedeb8caafef8f35654e7",
                "eujeF5ZBDV3qJyKeHxNqnmJsrc9iN7eHJGECsRuSXvLmnNjsWX",
            ),
        ];
        for (seed, public_key, number) in cases {
            let account = Account::from_encoded_seed(seed, &Ed25519Deriver).unwrap();
            assert_eq!(account.seed().format(), SeedFormat::Legacy);
            assert_eq!(account.public_key().to_hex(), public_key);
            assert_eq!(account.account_number().encode(), number);
            assert_eq!(account.network(), Network::TestNet);
        }
    }

    #[test]
    fn test_parse_account_numbers() {
        let number =
            AccountNumber::parse("ec6yMcJATX6gjNwvqp8rbc4jNEasoUgbfBBGGyV5NvoJ54NXva").unwrap();
        assert_eq!(
            number.public_key().to_hex(),
            "58760a01edf5ed4f95bfe977d77a27627cd57a25df5dea885972212c2b1c0e2f"
        );
        assert_eq!(number.network(), Network::TestNet);

        let number =
            AccountNumber::parse("eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYVCb").unwrap();
        assert_eq!(number.network(), Network::TestNet);
        assert_eq!(number.key_variant(), 0x13);
        assert_eq!(
            number.public_key().to_hex(),
            "369f6ceb1c23dbccc61b75e7990d0b2db8e1ee8da1c44db32280e63ca5804f38"
        );

        // same key on live net
        let live =
            AccountNumber::parse("aTiGK2wjUTMRjKFEBQitp3mkK97NQLrQyQcFTfSeKwBCHhT9Nq").unwrap();
        assert_eq!(live.network(), Network::LiveNet);
        assert_eq!(live.key_variant(), 0x11);
        assert_eq!(live.public_key(), number.public_key());

        let live =
            AccountNumber::parse("aPbUArWcshmRP49i4zPcG4xEDsRDXmzpxpdSHYYx7xejmyAyA4").unwrap();
        assert_eq!(live.network(), Network::LiveNet);
        assert_eq!(
            live.public_key().to_hex(),
            "2d4633f4b3cb972e6ccc5a50b139f21c176acd522c673374c76939cdb4eb180a"
        );
    }

    #[test]
    fn test_invalid_account_numbers() {
        assert!(!AccountNumber::is_valid(""));
        assert!(!AccountNumber::is_valid("0OIl"));
        assert!(!AccountNumber::is_valid("eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYV"));
        // a seed is not an account number
        assert!(!AccountNumber::is_valid("9J877LVjhr3Xxd2nGzRVRVNUZpSKJF4TH"));
        assert!(AccountNumber::is_valid("fXXHGtCdFPuQvNhJ4nDPKCdwPxH7aSZ4842n2katZi319NsaCs"));
    }

    fn with_variant(variant: u64, key: &PublicKey) -> String {
        let mut bytes = varint::encode(variant);
        bytes.extend_from_slice(key.as_bytes());
        let sum = checksum(&bytes);
        bytes.extend_from_slice(&sum);
        bs58::encode(bytes).into_string()
    }

    #[test]
    fn test_key_variant_checks() {
        let number =
            AccountNumber::parse("eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYVCb").unwrap();
        let key = number.public_key();

        assert!(matches!(
            AccountNumber::parse(&with_variant(0x10, key)),
            Err(AccountError::NotPublicKey(0x10))
        ));
        assert!(matches!(
            AccountNumber::parse(&with_variant(0x21, key)),
            Err(AccountError::UnsupportedKeyType(0x02))
        ));
        assert_eq!(with_variant(0x13, key), number.encode());
        assert_eq!(
            with_variant(0x11, key),
            "aTiGK2wjUTMRjKFEBQitp3mkK97NQLrQyQcFTfSeKwBCHhT9Nq"
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let number =
            AccountNumber::parse("eMCcmw1SKoohNUf3LeioTFKaYNYfp2bzFYpjm3EddwxBSWYVCb").unwrap();
        let mut bytes = number.pack();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        let text = bs58::encode(bytes).into_string();
        assert!(matches!(
            AccountNumber::parse(&text),
            Err(AccountError::InvalidChecksum { actual: [0, 0, 0, 0], .. })
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let number =
            AccountNumber::parse("fXXHGtCdFPuQvNhJ4nDPKCdwPxH7aSZ4842n2katZi319NsaCs").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"fXXHGtCdFPuQvNhJ4nDPKCdwPxH7aSZ4842n2katZi319NsaCs\"");
        assert_eq!(serde_json::from_str::<AccountNumber>(&json).unwrap(), number);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn generated_accounts_roundtrip(seed_bytes in prop::array::uniform32(any::<u8>()), live in any::<bool>()) {
            let network = if live { Network::LiveNet } else { Network::TestNet };
            let seed = Seed::generate(&SeededEntropy::from_seed(seed_bytes), network);
            let account = Account::from_seed(seed, &Ed25519Deriver).unwrap();
            let text = account.account_number().encode();
            let parsed = AccountNumber::parse(&text).unwrap();
            prop_assert_eq!(&parsed, account.account_number());
            prop_assert_eq!(parsed.network(), network);
        }
    }
}
