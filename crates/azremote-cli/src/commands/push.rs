use anyhow::{Result, bail};
use std::path::Path;

use azremote_core::config::RemoteConfig;
use azremote_core::{HashInfo, TransferOptions};

pub async fn run(
    config: &RemoteConfig,
    local: &Path,
    target: &str,
    no_progress: bool,
) -> Result<()> {
    if !local.is_file() {
        bail!("{} is not a file", local.display());
    }
    let file_name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (tree, mut path) = super::open(config, target)?;
    if target.ends_with('/') || path.is_root() {
        path = path.join(&file_name);
    }

    let opts = TransferOptions {
        name: Some(file_name),
        no_progress_bar: no_progress,
    };
    tree.upload(local, &path, &opts).await?;

    let expected = HashInfo::md5_of_file(local).await?;
    match tree.get_file_hash(&path).await? {
        Some(stored) if stored == expected => {
            println!("Uploaded {} -> {path} ({stored})", local.display())
        }
        Some(stored) => bail!("hash mismatch for {path}: local {expected}, remote {stored}"),
        None => println!("Uploaded {} -> {path} (no stored hash)", local.display()),
    }
    Ok(())
}
