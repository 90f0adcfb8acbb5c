//! Explicitly constructed SDK context.
//!
//! Owns the word-list cache, the entropy source and the configuration, so
//! nothing in the crate needs process-wide state. Contexts are `Send + Sync`
//! and can be shared behind an `Arc`.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::account::{Account, AccountError};
use crate::config::{ConfigError, Network, SdkConfig};
use crate::crypto::{Ed25519Deriver, EntropySource, KeyDeriver, OsEntropy};
use crate::mnemonic::RecoveryPhrase;
use crate::seed::{Seed, SeedError};
use crate::wordlist::{Locale, WordLists, WordSource};

/// Context errors
#[derive(Debug, Error)]
pub enum ContextError {
    /// Seed belongs to another network than the context
    #[error("network mismatch: context is {expected}, seed is {actual}")]
    NetworkMismatch {
        /// Configured network
        expected: Network,
        /// Network of the supplied seed
        actual: Network,
    },
    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Seed failure
    #[error(transparent)]
    Seed(#[from] SeedError),
    /// Account failure
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Result type for context operations
pub type ContextResult<T> = Result<T, ContextError>;

/// Configuration, word lists, entropy and key derivation in one place
pub struct Context {
    config: SdkConfig,
    wordlists: WordLists,
    entropy: Box<dyn EntropySource>,
    deriver: Box<dyn KeyDeriver>,
}

impl Context {
    /// Context using OS entropy and Ed25519 derivation
    #[must_use]
    pub fn new(config: SdkConfig) -> Self {
        Self::with_entropy(config, Box::new(OsEntropy))
    }

    /// Context with a caller-supplied entropy source
    #[must_use]
    pub fn with_entropy(config: SdkConfig, entropy: Box<dyn EntropySource>) -> Self {
        let source = config
            .wordlist_dir
            .clone()
            .map_or(WordSource::Embedded, WordSource::Directory);
        Self {
            config,
            wordlists: WordLists::new(source),
            entropy,
            deriver: Box::new(Ed25519Deriver),
        }
    }

    /// Replace the key deriver
    #[must_use]
    pub fn with_deriver(mut self, deriver: Box<dyn KeyDeriver>) -> Self {
        self.deriver = deriver;
        self
    }

    /// Context from a JSON config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> ContextResult<Self> {
        let config = SdkConfig::load(path)?;
        info!(network = %config.network, locale = %config.locale, "Loaded SDK config");
        Ok(Self::new(config))
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Configured network
    #[must_use]
    pub const fn network(&self) -> Network {
        self.config.network
    }

    /// Word-list cache
    #[must_use]
    pub const fn wordlists(&self) -> &WordLists {
        &self.wordlists
    }

    /// Fresh compact seed for the configured network
    #[must_use]
    pub fn new_seed(&self) -> Seed {
        Seed::generate(self.entropy.as_ref(), self.config.network)
    }

    /// Decode a seed string. Any network is accepted.
    ///
    /// # Errors
    /// Returns the seed validation error
    pub fn decode_seed(&self, text: &str) -> ContextResult<Seed> {
        Ok(Seed::decode(text)?)
    }

    /// Recovery phrase in the configured locale
    ///
    /// # Errors
    /// Returns error if the word table cannot be loaded
    pub fn recovery_phrase(&self, seed: &Seed) -> ContextResult<RecoveryPhrase> {
        self.recovery_phrase_in(seed, self.config.locale)
    }

    /// Recovery phrase in an explicit locale
    ///
    /// # Errors
    /// Returns error if the word table cannot be loaded
    pub fn recovery_phrase_in(&self, seed: &Seed, locale: Locale) -> ContextResult<RecoveryPhrase> {
        Ok(seed.to_mnemonic(&self.wordlists, locale)?)
    }

    /// Seed from recovery words in either locale
    ///
    /// # Errors
    /// Returns mnemonic or seed validation errors
    pub fn recover_seed<S: AsRef<str>>(&self, words: &[S]) -> ContextResult<Seed> {
        Ok(Seed::from_words(&self.wordlists, words)?)
    }

    /// Account for `seed`, which must belong to the configured network
    ///
    /// # Errors
    /// Returns `NetworkMismatch` or derivation errors
    pub fn account(&self, seed: Seed) -> ContextResult<Account> {
        if seed.network() != self.config.network {
            return Err(ContextError::NetworkMismatch {
                expected: self.config.network,
                actual: seed.network(),
            });
        }
        Ok(Account::from_seed(seed, self.deriver.as_ref())?)
    }

    /// Fresh account for the configured network
    ///
    /// # Errors
    /// Returns derivation errors
    pub fn new_account(&self) -> ContextResult<Account> {
        self.account(self.new_seed())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(SdkConfig::default())
    }
}
