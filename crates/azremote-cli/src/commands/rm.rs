use anyhow::Result;

use azremote_core::config::RemoteConfig;

pub async fn run(config: &RemoteConfig, target: &str) -> Result<()> {
    let (tree, path) = super::open(config, target)?;
    tree.remove(&path).await?;
    println!("Removed {path}");
    Ok(())
}
