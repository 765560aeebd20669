//! End-to-end tests against a real storage account or the Azurite emulator.
//!
//! Skipped unless a connection string is provided. Run with:
//!   AZREMOTE_TEST_CONNECTION_STRING="UseDevelopmentStorage=true" \
//!   cargo test -p azremote-azure --test live -- --nocapture

use std::time::Duration;

use azremote_azure::AzureTree;
use azremote_core::config::{AzureCliConfig, RemoteConfig};
use azremote_core::{HashInfo, TransferOptions, Tree, WalkMode};
use futures::TryStreamExt;
use tempfile::TempDir;

const CONNECTION_STRING_ENV: &str = "AZREMOTE_TEST_CONNECTION_STRING";

fn live_tree(container: &str) -> Option<AzureTree> {
    let connection_string = std::env::var(CONNECTION_STRING_ENV).ok()?;
    let config = RemoteConfig {
        url: Some(format!("azure://{container}")),
        connection_string: Some(connection_string),
        ..Default::default()
    };
    let tree = AzureTree::with_profile(&config, &AzureCliConfig::empty())
        .expect("invalid live test configuration");
    Some(tree)
}

#[tokio::test]
async fn live_roundtrip() {
    let Some(tree) = live_tree("azremote-live-test") else {
        eprintln!("SKIP: {CONNECTION_STRING_ENV} not set");
        return;
    };

    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("payload.bin");
    // Bigger than one block so the staged upload path runs too.
    let data: Vec<u8> = (0..5 * 1024 * 1024u32).map(|i| (i % 253) as u8).collect();
    std::fs::write(&src, &data).unwrap();
    let expected = HashInfo::md5_of_file(&src).await.unwrap();

    let dir = tree.root().join("live");
    let remote = dir.join("payload.bin");

    tree.upload(&src, &remote, &TransferOptions::quiet())
        .await
        .expect("upload failed");
    println!("OK: upload");

    assert!(tree.exists(&remote).await.unwrap());
    assert!(!tree.is_dir(&remote).await.unwrap());
    assert_eq!(tree.get_file_hash(&remote).await.unwrap(), Some(expected));
    println!("OK: hash");

    let listed: Vec<_> = tree
        .walk_files(&dir, WalkMode::Children)
        .try_collect()
        .await
        .expect("listing failed");
    assert!(listed.contains(&remote));
    println!("OK: walk_files");

    let dst = tmp.path().join("out/payload.bin");
    tree.download(&remote, &dst, &TransferOptions::quiet())
        .await
        .expect("download failed");
    assert_eq!(std::fs::read(&dst).unwrap(), data);
    println!("OK: download");

    let copy = dir.join("copy.bin");
    tree.copy(&remote, &copy).await.expect("copy failed");
    println!("OK: copy started");

    let url = tree
        .generate_download_url(&remote, Duration::from_secs(600))
        .await
        .expect("signing failed");
    assert!(url.contains("sig="));
    println!("OK: signed url");

    tree.remove(&remote).await.expect("remove failed");
    assert!(!tree.exists(&remote).await.unwrap());
    // The copy may still be pending; give it the suggested poll interval.
    tokio::time::sleep(azremote_azure::tree::COPY_POLL_INTERVAL).await;
    let _ = tree.remove(&copy).await;
    println!("OK: remove");
}
