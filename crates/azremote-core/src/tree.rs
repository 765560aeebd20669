use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::hash::HashInfo;
use crate::path::{RemotePath, Scheme};

/// Lifetime of a download URL when the caller does not pick one.
pub const DEFAULT_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// How `walk_files` interprets the path it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// List the children of the path (a trailing separator is appended).
    #[default]
    Children,
    /// Raw prefix scan: `data/fi` matches `data/file` and `data/fig/x`.
    Prefix,
}

/// Display name and progress toggle for one transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    pub name: Option<String>,
    pub no_progress_bar: bool,
}

impl TransferOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            no_progress_bar: false,
        }
    }

    pub fn quiet() -> Self {
        Self {
            name: None,
            no_progress_bar: true,
        }
    }
}

/// Uniform capability set every remote storage backend implements.
#[async_trait]
pub trait Tree: Send + Sync {
    /// Scheme of the paths this tree accepts.
    fn scheme(&self) -> Scheme;

    /// Root location the tree was configured with.
    fn root(&self) -> &RemotePath;

    async fn exists(&self, path: &RemotePath) -> Result<bool>;

    /// A "directory" is any path that does not name a hashed object.
    async fn is_dir(&self, path: &RemotePath) -> Result<bool>;

    /// Stored content hash, `None` when the object is missing or was stored
    /// without one.
    async fn get_file_hash(&self, path: &RemotePath) -> Result<Option<HashInfo>>;

    /// Lazily list every file under `path`, one page per fetch.
    fn walk_files<'a>(
        &'a self,
        path: &'a RemotePath,
        mode: WalkMode,
    ) -> BoxStream<'a, Result<RemotePath>>;

    async fn upload(&self, from: &Path, to: &RemotePath, opts: &TransferOptions) -> Result<()>;

    async fn download(&self, from: &RemotePath, to: &Path, opts: &TransferOptions) -> Result<()>;

    /// Server-side copy. Completion is not guaranteed when this returns.
    async fn copy(&self, from: &RemotePath, to: &RemotePath) -> Result<()>;

    async fn remove(&self, path: &RemotePath) -> Result<()>;

    /// Time-limited, read-only URL for one object.
    async fn generate_download_url(&self, path: &RemotePath, expires: Duration)
    -> Result<String>;
}
