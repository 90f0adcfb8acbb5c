//! Network tags and SDK configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wordlist::Locale;

/// The chain a seed or account belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network
    #[serde(alias = "live_net", alias = "livenet")]
    LiveNet,
    /// Test network
    #[serde(alias = "test_net", alias = "testnet")]
    TestNet,
}

impl Network {
    /// Both networks, in tag order
    pub const ALL: [Self; 2] = [Self::LiveNet, Self::TestNet];

    /// Wire tag
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::LiveNet => 0x00,
            Self::TestNet => 0x01,
        }
    }

    /// Network for a wire tag, if known
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::LiveNet),
            0x01 => Some(Self::TestNet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiveNet => f.write_str("livenet"),
            Self::TestNet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" | "livenet" | "live_net" => Ok(Self::LiveNet),
            "test" | "testnet" | "test_net" => Ok(Self::TestNet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// SDK configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Network new seeds and accounts are created for
    pub network: Network,
    /// Locale used when rendering recovery phrases
    pub locale: Locale,
    /// Directory holding `bip39_eng.txt` and `bip39_cn.txt`; the tables
    /// compiled into the binary are used when unset
    pub wordlist_dir: Option<PathBuf>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            network: Network::TestNet,
            locale: Locale::English,
            wordlist_dir: None,
        }
    }
}

impl SdkConfig {
    /// Config for the given network, other fields defaulted
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Load a JSON config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load the config at [`SdkConfig::default_path`], or defaults if absent
    ///
    /// # Errors
    /// Returns error if the file exists but is invalid
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config as pretty JSON
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// `~/.bitmark/config.json`
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bitmark")
            .join("config.json")
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("config IO error at {path}: {message}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        message: String,
    },
    /// File is not valid config JSON
    #[error("invalid config: {0}")]
    Parse(String),
    /// Unrecognised network name
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_network_values() {
        for network in Network::ALL {
            assert_eq!(Network::from_value(network.value()), Some(network));
        }
        assert_eq!(Network::from_value(0x02), None);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::TestNet);
        assert_eq!("LIVE".parse::<Network>().unwrap(), Network::LiveNet);
        assert!("mainnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config: SdkConfig = serde_json::from_str(r#"{"network": "livenet"}"#).unwrap();
        assert_eq!(config.network, Network::LiveNet);
        assert_eq!(config.locale, Locale::English);
        assert!(config.wordlist_dir.is_none());
    }

    #[test]
    fn test_config_save_load() {
        let path = temp_dir().join("bitmark_account_test_config.json");
        let config = SdkConfig {
            network: Network::LiveNet,
            locale: Locale::TraditionalChinese,
            wordlist_dir: Some(PathBuf::from("/opt/words")),
        };
        config.save(&path).unwrap();

        let loaded = SdkConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_load_missing() {
        let err = SdkConfig::load("/nonexistent/bitmark/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
