//! Resolution of remote options against the Azure CLI profile.

use std::fmt;

use azremote_core::config::{AzureCliConfig, RemoteConfig, redact};
use azremote_core::{RemotePath, Result, Scheme, TreeError};

/// Section of the Azure CLI config holding storage defaults.
pub const PROFILE_SECTION: &str = "storage";

const DEFAULT_URL: &str = "azure://";

/// Auth options handed to a [`Connector`](crate::Connector).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub connection_string: Option<String>,
    pub sas_token: Option<String>,
    pub account_name: Option<String>,
    pub account_key: Option<String>,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("connection_string", &redact(&self.connection_string))
            .field("sas_token", &redact(&self.sas_token))
            .field("account_name", &self.account_name)
            .field("account_key", &redact(&self.account_key))
            .finish()
    }
}

/// Resolve the tree root and auth options.
///
/// Explicit remote options win; anything unset falls back to the `[storage]`
/// section of the Azure CLI profile.
pub fn resolve(
    config: &RemoteConfig,
    profile: &AzureCliConfig,
) -> Result<(RemotePath, ConnectionOptions)> {
    let url = config.url.as_deref().unwrap_or(DEFAULT_URL);
    let mut path_info = RemotePath::parse(url)?;
    if path_info.scheme() != Scheme::Azure {
        return Err(TreeError::InvalidPath(
            url.to_string(),
            format!("expected an {} url", Scheme::Azure),
        ));
    }

    if path_info.bucket().is_empty() {
        let container = profile
            .get(PROFILE_SECTION, "container_name")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                TreeError::Config(format!(
                    "no container in `{url}` and no `container_name` in the Azure CLI profile"
                ))
            })?;
        path_info = RemotePath::new(Scheme::Azure, container, "");
    }

    let pick = |explicit: &Option<String>, option: &str| {
        explicit
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| profile.get(PROFILE_SECTION, option))
    };

    let options = ConnectionOptions {
        connection_string: pick(&config.connection_string, "connection_string"),
        sas_token: pick(&config.sas_token, "sas_token"),
        account_name: pick(&config.account, "account"),
        account_key: pick(&config.key, "key"),
    };

    Ok((path_info, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn profile(body: &str) -> (TempDir, AzureCliConfig) {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config"), body).unwrap();
        let config = AzureCliConfig::load(tmp.path(), HashMap::new()).unwrap();
        (tmp, config)
    }

    #[test]
    fn container_from_url() {
        let config = RemoteConfig {
            url: Some("azure://data/cache".into()),
            ..Default::default()
        };
        let (path, _) = resolve(&config, &AzureCliConfig::empty()).unwrap();
        assert_eq!(path.bucket(), "data");
        assert_eq!(path.path(), "cache");
    }

    #[test]
    fn container_from_profile_when_url_has_none() {
        let (_tmp, profile) = profile("[storage]\ncontainer_name = from-profile\n");
        for url in [None, Some("azure://".to_string())] {
            let config = RemoteConfig {
                url,
                ..Default::default()
            };
            let (path, _) = resolve(&config, &profile).unwrap();
            assert_eq!(path.bucket(), "from-profile");
            assert!(path.is_root());
        }
    }

    #[test]
    fn missing_container_is_a_config_error() {
        let result = resolve(&RemoteConfig::default(), &AzureCliConfig::empty());
        assert!(matches!(result, Err(TreeError::Config(_))));
    }

    #[test]
    fn rejects_foreign_scheme() {
        let config = RemoteConfig {
            url: Some("s3://bucket".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&config, &AzureCliConfig::empty()),
            Err(TreeError::InvalidPath(..))
        ));
    }

    #[test]
    fn explicit_options_win_over_profile() {
        let (_tmp, profile) = profile(
            "[storage]\naccount = profile-acct\nkey = cHJvZmlsZQ==\nsas_token = profile-sas\nconnection_string = AccountName=p\n",
        );
        let config = RemoteConfig {
            url: Some("azure://c".into()),
            account: Some("explicit-acct".into()),
            sas_token: Some("explicit-sas".into()),
            ..Default::default()
        };
        let (_, options) = resolve(&config, &profile).unwrap();
        assert_eq!(options.account_name.as_deref(), Some("explicit-acct"));
        assert_eq!(options.sas_token.as_deref(), Some("explicit-sas"));
        assert_eq!(options.account_key.as_deref(), Some("cHJvZmlsZQ=="));
        assert_eq!(options.connection_string.as_deref(), Some("AccountName=p"));
    }

    #[test]
    fn absent_everywhere_stays_absent() {
        let config = RemoteConfig {
            url: Some("azure://c".into()),
            ..Default::default()
        };
        let (_, options) = resolve(&config, &AzureCliConfig::empty()).unwrap();
        assert_eq!(options, ConnectionOptions::default());
    }

    #[test]
    fn debug_hides_secrets() {
        let options = ConnectionOptions {
            account_key: Some("secret-key".into()),
            connection_string: Some("AccountKey=secret".into()),
            ..Default::default()
        };
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("secret"));
    }
}
