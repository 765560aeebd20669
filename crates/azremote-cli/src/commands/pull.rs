use anyhow::Result;
use std::path::{Path, PathBuf};

use azremote_core::TransferOptions;
use azremote_core::config::RemoteConfig;

pub async fn run(
    config: &RemoteConfig,
    target: &str,
    local: &Path,
    no_progress: bool,
) -> Result<()> {
    let (tree, path) = super::open(config, target)?;

    let dest: PathBuf = if local.is_dir() {
        local.join(path.name())
    } else {
        local.to_path_buf()
    };

    let opts = TransferOptions {
        name: Some(path.name().to_string()),
        no_progress_bar: no_progress,
    };
    tree.download(&path, &dest, &opts).await?;

    println!("Downloaded {path} -> {}", dest.display());
    Ok(())
}
