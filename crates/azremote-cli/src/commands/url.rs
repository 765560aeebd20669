use anyhow::Result;
use std::time::Duration;

use azremote_core::config::RemoteConfig;

pub async fn run(config: &RemoteConfig, target: &str, expires: u64) -> Result<()> {
    let (tree, path) = super::open(config, target)?;
    let url = tree
        .generate_download_url(&path, Duration::from_secs(expires))
        .await?;
    println!("{url}");
    Ok(())
}
