//! # bitmark-account
//!
//! Deterministic account-secret codec for the Bitmark blockchain.
//!
//! ## Pipeline
//!
//! - **Entropy**: 16 random bytes plus a network flag nibble (compact) or
//!   32 random bytes (legacy)
//! - **Seed**: versioned, network-tagged container with a SHA3 checksum,
//!   Base58 encoded
//! - **Recovery phrase**: 12 or 24 words from the English or Traditional
//!   Chinese BIP39 tables
//! - **Account number**: Base58 of the Ed25519 public key derived from the
//!   seed
//!
//! ## Example
//!
//! ```no_run
//! use bitmark_account::{Context, Network, SdkConfig};
//!
//! let ctx = Context::new(SdkConfig::for_network(Network::TestNet));
//! let account = ctx.new_account()?;
//! let phrase = ctx.recovery_phrase(account.seed())?;
//! println!("{} {}", account.account_number(), phrase);
//! # Ok::<(), bitmark_account::ContextError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms
)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod account;
pub mod config;
pub mod context;
pub mod crypto;
pub mod mnemonic;
pub mod seed;
pub mod wordlist;

pub use account::{Account, AccountError, AccountNumber};
pub use config::{ConfigError, Network, SdkConfig};
pub use context::{Context, ContextError};
pub use crypto::{Ed25519Deriver, EntropySource, KeyDeriver, OsEntropy, PublicKey, SeededEntropy};
pub use mnemonic::{MnemonicError, PhraseLength, RecoveryPhrase};
pub use seed::{Seed, SeedError, SeedFormat};
pub use wordlist::{Locale, WordList, WordListError, WordLists, WordSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
