//! bitmark-account - create, inspect and recover Bitmark account seeds

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bitmark_account::crypto::decode_hex;
use bitmark_account::{AccountNumber, Context, Locale, Network, RecoveryPhrase, SdkConfig, Seed};

const RULE: &str = "═══════════════════════════════════════════════════════════";

#[derive(Parser)]
#[command(name = "bitmark-account")]
#[command(about = "Bitmark account seed and recovery phrase tool", version)]
struct Cli {
    /// Config file (defaults to ~/.bitmark/config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network override
    #[arg(short, long, global = true)]
    network: Option<Network>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new account
    New {
        /// Phrase locale
        #[arg(short, long)]
        locale: Option<Locale>,
    },

    /// Decode and validate an encoded seed
    Inspect {
        /// Base58 seed
        seed: String,
    },

    /// Print the recovery phrase for a seed
    Phrase {
        /// Base58 seed
        seed: String,
        /// Phrase locale
        #[arg(short, long)]
        locale: Option<Locale>,
    },

    /// Recover a seed from its 12 or 24 words
    Recover {
        /// Recovery words
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Derive the account number for a seed
    Account {
        /// Base58 seed
        seed: String,
    },

    /// Encode a raw seed core given in hex
    Encode {
        /// Core bytes as hex (17 bytes compact, 32 bytes legacy)
        core: String,
        /// Build a legacy seed on the configured network
        #[arg(long)]
        legacy: bool,
    },

    /// Validate an account number
    CheckAccount {
        /// Base58 account number
        number: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<SdkConfig> {
    let mut config = match &cli.config {
        Some(path) => SdkConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SdkConfig::load_or_default().context("loading default config")?,
    };
    if let Some(network) = cli.network {
        config.network = network;
    }
    Ok(config)
}

fn print_phrase(phrase: &RecoveryPhrase) {
    let words = phrase.words();
    let rows = words.len() / 4;
    println!("  Recovery phrase ({} words, {}):", words.len(), phrase.locale());
    for row in 0..rows {
        print!("    ");
        for col in 0..4 {
            let idx = col * rows + row;
            print!("{:2}. {:<10} ", idx + 1, words[idx]);
        }
        println!();
    }
    println!();
    println!("  Copy-paste format:");
    println!("  {phrase}");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let ctx = Context::new(config);

    match cli.command {
        Commands::New { locale } => {
            let account = ctx.new_account()?;
            let phrase = ctx.recovery_phrase_in(account.seed(), locale.unwrap_or(ctx.config().locale))?;
            println!("{RULE}");
            println!("  IMPORTANT: Write down the recovery phrase and store it SECURELY!");
            println!("{RULE}");
            println!("  Network:  {}", account.network());
            println!("  Account:  {}", account.account_number());
            println!("  Seed:     {}", account.seed());
            println!();
            print_phrase(&phrase);
            println!("{RULE}");
        }

        Commands::Inspect { seed } => {
            let seed = ctx.decode_seed(&seed)?;
            println!("  Format:   {:?}", seed.format());
            println!("  Version:  {:#04x}", seed.version());
            println!("  Network:  {}", seed.network());
            println!("  Core:     {} bytes", seed.core().len());
        }

        Commands::Phrase { seed, locale } => {
            let seed = ctx.decode_seed(&seed)?;
            let phrase = ctx.recovery_phrase_in(&seed, locale.unwrap_or(ctx.config().locale))?;
            print_phrase(&phrase);
        }

        Commands::Recover { words } => {
            let seed = ctx.recover_seed(words.as_slice())?;
            println!("  Network:  {}", seed.network());
            println!("  Seed:     {seed}");
        }

        Commands::Account { seed } => {
            let seed: Seed = ctx.decode_seed(&seed)?;
            if cli.network.is_none() && seed.network() != ctx.network() {
                bail!(
                    "seed is for {}, context is {}; pass --network {}",
                    seed.network(),
                    ctx.network(),
                    seed.network()
                );
            }
            let account = ctx.account(seed)?;
            println!("  Network:     {}", account.network());
            println!("  Account:     {}", account.account_number());
            println!("  Public key:  {}", account.public_key());
        }

        Commands::Encode { core, legacy } => {
            let core = decode_hex(&core).context("reading seed core")?;
            let seed = if legacy {
                Seed::from_legacy_core(&core, ctx.network())?
            } else {
                Seed::from_core(&core)?
            };
            println!("  Format:   {:?}", seed.format());
            println!("  Network:  {}", seed.network());
            println!("  Seed:     {seed}");
        }

        Commands::CheckAccount { number } => {
            let number = AccountNumber::parse(&number)
                .with_context(|| format!("{number} is not a valid account number"))?;
            println!("  Network:     {}", number.network());
            println!("  Public key:  {}", number.public_key());
        }
    }

    Ok(())
}
