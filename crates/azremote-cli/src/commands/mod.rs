pub mod cp;
pub mod factory;
pub mod ls;
pub mod pull;
pub mod push;
pub mod rm;
pub mod stat;
pub mod url;

use anyhow::Result;
use std::path::Path;

use azremote_core::config::RemoteConfig;
use azremote_core::{RemotePath, Scheme, Tree};

/// Remote options: the config file (explicit, or the default one when it
/// exists), with command-line values on top.
pub fn load_config(path: Option<&Path>, overrides: RemoteConfig) -> Result<RemoteConfig> {
    let base = match path {
        Some(path) => RemoteConfig::load(path)?,
        None => match RemoteConfig::default_base_dir() {
            Ok(dir) if RemoteConfig::default_path(&dir).exists() => {
                RemoteConfig::load(&RemoteConfig::default_path(&dir))?
            }
            _ => RemoteConfig::default(),
        },
    };
    Ok(base.overridden_by(overrides))
}

/// Open the tree serving `target` and resolve `target` on it.
///
/// A full URL naming a container roots the tree at that container; anything
/// else is taken relative to the configured remote root.
pub fn open(config: &RemoteConfig, target: &str) -> Result<(Box<dyn Tree>, RemotePath)> {
    let mut config = config.clone();
    let scheme = if target.contains("://") {
        let path = RemotePath::parse(target)?;
        if !path.bucket().is_empty() {
            config.url = Some(path.replace_path("").to_string());
        }
        path.scheme()
    } else {
        match config.url.as_deref() {
            Some(url) => RemotePath::parse(url)?.scheme(),
            None => Scheme::Azure,
        }
    };

    let tree = factory::create_tree(scheme, &config)?;
    let path = resolve(tree.as_ref(), target)?;
    Ok((tree, path))
}

/// Resolve `target` against the root of `tree`.
pub fn resolve(tree: &dyn Tree, target: &str) -> Result<RemotePath> {
    if !target.contains("://") {
        return Ok(tree.root().join(target));
    }
    let path = RemotePath::parse(target)?;
    if path.bucket().is_empty() {
        Ok(tree.root().join(path.path()))
    } else {
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn flags_override_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "url = \"azure://data\"\naccount = \"from-file\"\n").unwrap();

        let config = load_config(
            Some(&path),
            RemoteConfig {
                account: Some("from-flag".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.url.as_deref(), Some("azure://data"));
        assert_eq!(config.account.as_deref(), Some("from-flag"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")), RemoteConfig::default());
        assert!(result.is_err());
    }

    #[cfg(feature = "azure")]
    #[test]
    fn targets_resolve_against_root() {
        let config = RemoteConfig {
            url: Some("azure://data/cache".into()),
            account: Some("acct".into()),
            ..Default::default()
        };

        let (tree, path) = open(&config, "ab/cdef").unwrap();
        assert_eq!(tree.root().to_string(), "azure://data/cache");
        assert_eq!(path.to_string(), "azure://data/cache/ab/cdef");

        let (tree, path) = open(&config, "azure://other/x/y").unwrap();
        assert_eq!(tree.root().bucket(), "other");
        assert_eq!(path.path(), "x/y");

        let other = resolve(tree.as_ref(), "z").unwrap();
        assert_eq!(other.to_string(), "azure://other/z");
    }

    #[test]
    fn foreign_scheme_is_rejected() {
        let result = open(&RemoteConfig::default(), "s3://bucket/key");
        assert!(result.is_err());
    }
}
