pub mod azure_cli;

use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use azure_cli::AzureCliConfig;

/// Per-remote options, as written in `config.toml`.
///
/// Every field is optional: whatever is missing is looked up in the Azure CLI
/// profile by the tree that consumes it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote location, e.g. `azure://container/prefix`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub sas_token: Option<String>,
    /// Storage account name.
    #[serde(default)]
    pub account: Option<String>,
    /// Storage account key (base64).
    #[serde(default)]
    pub key: Option<String>,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("connection_string", &redact(&self.connection_string))
            .field("sas_token", &redact(&self.sas_token))
            .field("account", &self.account)
            .field("key", &redact(&self.key))
            .finish()
    }
}

/// Debug stand-in for a secret value.
pub fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[REDACTED]")
}

impl RemoteConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TreeError::Config(format!(
                "config file not found at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| TreeError::TomlDe(e.to_string()))
    }

    /// Values set in `other` win over values set in `self`.
    pub fn overridden_by(mut self, other: RemoteConfig) -> Self {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.connection_string.is_some() {
            self.connection_string = other.connection_string;
        }
        if other.sas_token.is_some() {
            self.sas_token = other.sas_token;
        }
        if other.account.is_some() {
            self.account = other.account;
        }
        if other.key.is_some() {
            self.key = other.key;
        }
        self
    }

    /// Resolve the config file path: `<base_dir>/config.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("config.toml")
    }

    /// Resolve the default azremote home directory: `~/.azremote`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".azremote"))
            .ok_or_else(|| TreeError::Config("Cannot determine home directory".to_string()))
    }
}
