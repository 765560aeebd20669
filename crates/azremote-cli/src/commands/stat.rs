use anyhow::Result;

use azremote_core::config::RemoteConfig;

pub async fn run(config: &RemoteConfig, target: &str) -> Result<()> {
    let (tree, path) = super::open(config, target)?;

    let exists = tree.exists(&path).await?;
    let is_dir = tree.is_dir(&path).await?;
    let hash = tree.get_file_hash(&path).await?;

    println!("{path}");
    println!("  Exists:    {exists}");
    println!("  Directory: {is_dir}");
    match hash {
        Some(hash) => println!("  Hash:      {hash}"),
        None => println!("  Hash:      -"),
    }
    Ok(())
}
