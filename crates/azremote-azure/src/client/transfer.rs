use std::future::Future;
use std::path::Path;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use azure_core::Body;
use azure_storage_blobs::prelude::*;
use bytes::Bytes;
use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::body::ProgressBody;
use crate::service::{ProgressFn, ServiceError};

/// Largest file sent with a single Put Blob, and the size of staged blocks.
pub(crate) const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// How often progress is sampled while a request body is in flight.
const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// Block ids must all have the same length within a blob. The SDK
/// base64-encodes them on the wire.
fn block_id(index: usize) -> String {
    format!("{index:08}")
}

async fn read_block<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Bytes> {
    let mut buf = Vec::with_capacity(BLOCK_SIZE);
    reader.take(BLOCK_SIZE as u64).read_to_end(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Drive `request`, reporting `done + bytes sent so far` until it completes.
async fn tracked<T>(
    request: impl Future<Output = azure_core::Result<T>>,
    sent: &AtomicU64,
    done: u64,
    total: u64,
    progress: ProgressFn<'_>,
) -> azure_core::Result<T> {
    let mut request = pin!(request);
    let mut ticker = tokio::time::interval(PROGRESS_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = &mut request => return result,
            _ = ticker.tick() => progress(done + sent.load(Ordering::Relaxed), Some(total)),
        }
    }
}

pub(super) async fn upload(
    client: &BlobClient,
    blob: &str,
    from: &Path,
    progress: ProgressFn<'_>,
) -> Result<(), ServiceError> {
    let mut file = File::open(from).await?;
    let total = file.metadata().await?.len();
    let mut hasher = md5::Context::new();

    if total <= BLOCK_SIZE as u64 {
        let data = read_block(&mut file).await?;
        hasher.consume(&data);
        let len = data.len() as u64;
        let body = ProgressBody::new(data);
        let sent = body.counter();
        let request = client
            .put_block_blob(Body::SeekableStream(Box::new(body)))
            .content_md5(hasher.compute())
            .into_future();
        tracked(request, &sent, 0, total, progress)
            .await
            .map_err(|e| ServiceError::from_azure("put blob", e))?;
        progress(len, Some(total));
        return Ok(());
    }

    let mut blocks = Vec::new();
    let mut done = 0u64;
    loop {
        let data = read_block(&mut file).await?;
        if data.is_empty() {
            break;
        }
        hasher.consume(&data);
        let id = block_id(blocks.len());
        let len = data.len() as u64;
        let body = ProgressBody::new(data);
        let sent = body.counter();
        let request = client
            .put_block(BlockId::from(id.clone()), Body::SeekableStream(Box::new(body)))
            .into_future();
        tracked(request, &sent, done, total, progress)
            .await
            .map_err(|e| ServiceError::from_azure("put block", e))?;
        blocks.push(BlobBlockType::new_uncommitted(BlockId::from(id)));
        done += len;
        progress(done, Some(total));
    }

    debug!(blob, blocks = blocks.len(), "Committing block list");
    client
        .put_block_list(BlockList { blocks })
        .content_md5(hasher.compute())
        .await
        .map_err(|e| ServiceError::from_azure("put block list", e))?;
    Ok(())
}

pub(super) async fn download(
    client: &BlobClient,
    to: &Path,
    progress: ProgressFn<'_>,
) -> Result<(), ServiceError> {
    let mut chunks = client.get().into_stream();
    let mut response = chunks
        .next()
        .await
        .transpose()
        .map_err(|e| ServiceError::from_azure("get blob", e))?;
    // The destination is only touched once the blob is known to exist.
    let mut file = create_file(to).await?;
    let mut done = 0u64;

    while let Some(current) = response {
        let total = current.content_range.map(|range| range.total_length());
        let data = current
            .data
            .collect()
            .await
            .map_err(|e| ServiceError::from_azure("get blob", e))?;
        file.write_all(&data).await?;
        done += data.len() as u64;
        progress(done, total);

        response = chunks
            .next()
            .await
            .transpose()
            .map_err(|e| ServiceError::from_azure("get blob", e))?;
    }
    file.flush().await?;
    Ok(())
}

async fn create_file(to: &Path) -> std::io::Result<File> {
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    File::create(to).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_have_fixed_width() {
        let first = block_id(0);
        let later = block_id(12_345);
        assert_eq!(first.len(), later.len());
        assert_eq!(first, "00000000");
        assert_ne!(first, later);
    }

    #[tokio::test]
    async fn read_block_caps_at_block_size() {
        let data = vec![7u8; BLOCK_SIZE + 10];
        let mut reader = &data[..];
        assert_eq!(read_block(&mut reader).await.unwrap().len(), BLOCK_SIZE);
        assert_eq!(read_block(&mut reader).await.unwrap().len(), 10);
        assert!(read_block(&mut reader).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reports_progress_while_a_request_runs() {
        let sent = AtomicU64::new(0);
        let seen = std::sync::Mutex::new(Vec::new());
        let report = |current: u64, total: Option<u64>| {
            seen.lock().unwrap().push((current, total));
        };

        let request = async {
            sent.store(40, Ordering::Relaxed);
            tokio::time::sleep(PROGRESS_TICK * 3).await;
            sent.store(100, Ordering::Relaxed);
            tokio::time::sleep(PROGRESS_TICK * 3).await;
            Ok(7)
        };
        let result = tracked(request, &sent, 1000, 1100, &report).await.unwrap();
        assert_eq!(result, 7);

        let seen = seen.into_inner().unwrap();
        assert!(seen.contains(&(1040, Some(1100))), "{seen:?}");
        assert!(seen.contains(&(1100, Some(1100))), "{seen:?}");
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}
