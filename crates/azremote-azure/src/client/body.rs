use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use azure_core::SeekableStream;
use bytes::Bytes;
use futures::io::AsyncRead;

/// Request body that records how far the transport has read it.
///
/// Clones share the counter, which only moves forward, so a retried request
/// never reports less progress than an earlier attempt.
#[derive(Clone)]
pub(super) struct ProgressBody {
    data: Bytes,
    offset: usize,
    sent: Arc<AtomicU64>,
}

impl ProgressBody {
    pub(super) fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            sent: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(super) fn counter(&self) -> Arc<AtomicU64> {
        self.sent.clone()
    }
}

impl fmt::Debug for ProgressBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBody")
            .field("len", &self.data.len())
            .field("offset", &self.offset)
            .finish()
    }
}

impl AsyncRead for ProgressBody {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let remaining = &this.data[this.offset..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        this.offset += n;
        this.sent.fetch_max(this.offset as u64, Ordering::Relaxed);
        Poll::Ready(Ok(n))
    }
}

#[async_trait]
impl SeekableStream for ProgressBody {
    async fn reset(&mut self) -> azure_core::Result<()> {
        self.offset = 0;
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
