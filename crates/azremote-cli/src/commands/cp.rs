use anyhow::Result;

use azremote_core::config::RemoteConfig;

pub async fn run(config: &RemoteConfig, source: &str, dest: &str) -> Result<()> {
    let (tree, from) = super::open(config, source)?;
    let to = super::resolve(tree.as_ref(), dest)?;

    tree.copy(&from, &to).await?;

    // The service finishes the copy on its own schedule.
    println!("Copy started: {from} -> {to}");
    Ok(())
}
