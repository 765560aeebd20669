use anyhow::Result;
use futures::TryStreamExt;
use tracing::info;

use azremote_core::WalkMode;
use azremote_core::config::RemoteConfig;

pub async fn run(config: &RemoteConfig, target: &str, prefix: bool) -> Result<()> {
    let (tree, path) = super::open(config, target)?;
    let mode = if prefix {
        WalkMode::Prefix
    } else {
        WalkMode::Children
    };

    let mut files = tree.walk_files(&path, mode);
    let mut count = 0usize;
    while let Some(file) = files.try_next().await? {
        println!("{file}");
        count += 1;
    }

    info!(count, "Listed {path}");
    Ok(())
}
