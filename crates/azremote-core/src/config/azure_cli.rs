//! Read-only view of the Azure CLI configuration (`~/.azure/config`).
//!
//! Lookups of `(section, option)` consult the environment variable
//! `AZURE_<SECTION>_<OPTION>` first and the INI file second, the same way the
//! Azure CLI itself layers them.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use crate::error::{Result, TreeError};

/// Overrides the directory holding the Azure CLI `config` file.
pub const CONFIG_DIR_ENV: &str = "AZURE_CONFIG_DIR";

const ENV_PREFIX: &str = "AZURE";
const CONFIG_FILE: &str = "config";

#[derive(Clone, Default)]
pub struct AzureCliConfig {
    config_dir: Option<PathBuf>,
    ini: Option<Ini>,
    env: HashMap<String, String>,
}

impl fmt::Debug for AzureCliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCliConfig")
            .field("config_dir", &self.config_dir)
            .field("file_loaded", &self.ini.is_some())
            .finish()
    }
}

impl AzureCliConfig {
    /// Load from `$AZURE_CONFIG_DIR` (or `~/.azure`) using the process environment.
    pub fn load_default() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        match Self::default_dir(&env) {
            Some(dir) => Self::load(&dir, env),
            None => Ok(Self {
                env,
                ..Default::default()
            }),
        }
    }

    /// Load `<config_dir>/config`. A missing file yields an empty profile.
    pub fn load(config_dir: &Path, env: HashMap<String, String>) -> Result<Self> {
        let file = config_dir.join(CONFIG_FILE);
        let ini = if file.is_file() {
            debug!(path = %file.display(), "Loading Azure CLI config");
            let ini = Ini::load_from_file_noescape(&file).map_err(|e| {
                TreeError::Config(format!("cannot read {}: {e}", file.display()))
            })?;
            Some(ini)
        } else {
            None
        };
        Ok(Self {
            config_dir: Some(config_dir.to_path_buf()),
            ini,
            env,
        })
    }

    /// Profile with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn default_dir(env: &HashMap<String, String>) -> Option<PathBuf> {
        match env.get(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::home_dir().map(|h| h.join(".azure")),
        }
    }

    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        let var = format!("{ENV_PREFIX}_{section}_{option}").to_uppercase();
        if let Some(value) = self.env.get(&var) {
            return Some(value.clone());
        }
        self.ini
            .as_ref()?
            .section(Some(section))?
            .get(option)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) {
        std::fs::write(dir.join("config"), body).unwrap();
    }

    #[test]
    fn reads_storage_section() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "[core]\noutput = json\n\n[storage]\naccount = acct\ncontainer_name = dvc\n",
        );
        let config = AzureCliConfig::load(tmp.path(), HashMap::new()).unwrap();
        assert_eq!(config.get("storage", "account").as_deref(), Some("acct"));
        assert_eq!(
            config.get("storage", "container_name").as_deref(),
            Some("dvc")
        );
        assert!(config.get("storage", "key").is_none());
        assert!(config.get("missing", "key").is_none());
    }

    #[test]
    fn env_overrides_file() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "[storage]\naccount = from-file\n");
        let env = HashMap::from([(
            "AZURE_STORAGE_ACCOUNT".to_string(),
            "from-env".to_string(),
        )]);
        let config = AzureCliConfig::load(tmp.path(), env).unwrap();
        assert_eq!(config.get("storage", "account").as_deref(), Some("from-env"));
    }

    #[test]
    fn missing_file_is_empty_profile() {
        let tmp = TempDir::new().unwrap();
        let config = AzureCliConfig::load(tmp.path(), HashMap::new()).unwrap();
        assert!(config.get("storage", "account").is_none());
        assert_eq!(config.config_dir(), Some(tmp.path()));
    }

    #[test]
    fn connection_string_kept_verbatim() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "[storage]\nconnection_string = AccountName=a;AccountKey=k+/==;EndpointSuffix=core.windows.net\n",
        );
        let config = AzureCliConfig::load(tmp.path(), HashMap::new()).unwrap();
        assert_eq!(
            config.get("storage", "connection_string").as_deref(),
            Some("AccountName=a;AccountKey=k+/==;EndpointSuffix=core.windows.net")
        );
    }

    #[test]
    fn config_dir_env_wins() {
        let env = HashMap::from([(CONFIG_DIR_ENV.to_string(), "/tmp/az".to_string())]);
        assert_eq!(
            AzureCliConfig::default_dir(&env),
            Some(PathBuf::from("/tmp/az"))
        );
    }
}
