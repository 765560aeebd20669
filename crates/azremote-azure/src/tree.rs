use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use azremote_core::config::{AzureCliConfig, RemoteConfig};
use azremote_core::hash::MD5;
use azremote_core::progress::TransferProgress;
use azremote_core::{
    HashInfo, RemotePath, Result, Scheme, TransferOptions, Tree, TreeError, WalkMode,
};
use chrono::Utc;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::{self, ConnectionOptions};
use crate::service::{BlobService, Connector, ListRequest, SdkConnector};

/// Scheme served by [`AzureTree`].
pub const SCHEME: Scheme = Scheme::Azure;

/// Checksum reported by [`AzureTree::get_file_hash`].
pub const CHECKSUM: &str = MD5;

/// Suggested interval for callers polling a server-side copy.
pub const COPY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// `maxresults` of every listing page.
pub const LIST_PAGE_SIZE: u32 = 5000;

/// Blob URLs collapse `.` and `..` components, so such a name would reach a
/// different object than the one asked for.
fn check_addressable(path: &RemotePath) -> Result<()> {
    if path.has_dot_segment() {
        return Err(TreeError::InvalidPath(
            path.to_string(),
            "`.` and `..` components cannot be addressed in a blob URL".to_string(),
        ));
    }
    Ok(())
}

/// Azure Blob Storage container exposed as a [`Tree`].
///
/// Construction only resolves configuration. The blob service is built on
/// first use, at most once per tree, and the container is created then if it
/// does not exist yet.
pub struct AzureTree {
    path_info: RemotePath,
    options: ConnectionOptions,
    connector: Arc<dyn Connector>,
    blob_service: OnceCell<Arc<dyn BlobService>>,
}

impl AzureTree {
    /// Resolve `config` against the Azure CLI profile of the current user.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let profile = AzureCliConfig::load_default()?;
        Self::with_profile(config, &profile)
    }

    pub fn with_profile(config: &RemoteConfig, profile: &AzureCliConfig) -> Result<Self> {
        Self::with_connector(config, profile, Arc::new(SdkConnector::default()))
    }

    pub fn with_connector(
        config: &RemoteConfig,
        profile: &AzureCliConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let (path_info, options) = config::resolve(config, profile)?;
        Ok(Self {
            path_info,
            options,
            connector,
            blob_service: OnceCell::new(),
        })
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// The shared blob service, connecting on first call.
    pub async fn blob_service(&self) -> Result<&Arc<dyn BlobService>> {
        self.blob_service.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Arc<dyn BlobService>> {
        debug!(
            url = %self.path_info,
            options = ?self.options,
            "Connecting to Azure Blob Storage"
        );
        let service = self.connector.connect(&self.options)?;

        let container = self.path_info.bucket();
        debug!(container, "Checking container");
        let first_entry = ListRequest {
            container,
            delimiter: Some("/"),
            max_results: Some(1),
            ..Default::default()
        };
        match service.list_blobs(first_entry).try_next().await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                info!(container, "Container not found, creating it");
                service.create_container(container).await?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(service)
    }

    async fn get_md5(&self, path: &RemotePath) -> Result<Option<HashInfo>> {
        check_addressable(path)?;
        let service = self.blob_service().await?;
        let properties = service.blob_properties(path.bucket(), path.path()).await?;
        match properties.and_then(|p| p.content_md5) {
            Some(encoded) => HashInfo::from_content_md5(&encoded),
            None => Ok(None),
        }
    }

    /// Every blob name under `prefix`, one page fetched per pull.
    fn list_paths<'a>(
        &'a self,
        container: &'a str,
        prefix: String,
    ) -> BoxStream<'a, Result<String>> {
        stream::once(self.blob_service())
            .map_ok(move |service| {
                service
                    .list_blobs(ListRequest {
                        container,
                        prefix: &prefix,
                        max_results: Some(LIST_PAGE_SIZE),
                        delimiter: None,
                    })
                    .map_err(TreeError::from)
            })
            .try_flatten()
            .map_ok(|page| stream::iter(page.names.into_iter().map(Ok::<_, TreeError>)))
            .try_flatten()
            .boxed()
    }

    /// Keep real objects only: no directory markers, no blobs without a hash.
    async fn file_entry(&self, root: &RemotePath, name: String) -> Result<Option<RemotePath>> {
        if name.ends_with('/') {
            return Ok(None);
        }
        let entry = root.replace_path(name);
        if entry.has_dot_segment() {
            warn!(name = entry.path(), "Skipping blob that cannot be addressed by URL");
            return Ok(None);
        }
        if self.get_md5(&entry).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(entry))
    }
}

#[async_trait]
impl Tree for AzureTree {
    fn scheme(&self) -> Scheme {
        SCHEME
    }

    fn root(&self) -> &RemotePath {
        &self.path_info
    }

    async fn exists(&self, path: &RemotePath) -> Result<bool> {
        check_addressable(path)?;
        let service = self.blob_service().await?;
        Ok(service.blob_exists(path.bucket(), path.path()).await?)
    }

    async fn is_dir(&self, path: &RemotePath) -> Result<bool> {
        Ok(self.get_file_hash(path).await?.is_none())
    }

    async fn get_file_hash(&self, path: &RemotePath) -> Result<Option<HashInfo>> {
        self.get_md5(path).await
    }

    fn walk_files<'a>(
        &'a self,
        path: &'a RemotePath,
        mode: WalkMode,
    ) -> BoxStream<'a, Result<RemotePath>> {
        let prefix = match mode {
            WalkMode::Children => path.join("").path().to_string(),
            WalkMode::Prefix => path.path().to_string(),
        };
        self.list_paths(path.bucket(), prefix)
            .try_filter_map(move |name| self.file_entry(path, name))
            .boxed()
    }

    async fn upload(&self, from: &Path, to: &RemotePath, opts: &TransferOptions) -> Result<()> {
        check_addressable(to)?;
        let service = self.blob_service().await?;
        let progress = TransferProgress::new(
            Some(opts.name.as_deref().unwrap_or(to.name())),
            opts.no_progress_bar,
        );
        let report = |current: u64, total: Option<u64>| progress.update_to(current, total);
        let result = service
            .upload_file(to.bucket(), to.path(), from, &report)
            .await;
        progress.finish();
        Ok(result?)
    }

    async fn download(&self, from: &RemotePath, to: &Path, opts: &TransferOptions) -> Result<()> {
        check_addressable(from)?;
        let service = self.blob_service().await?;
        let progress = TransferProgress::new(
            Some(opts.name.as_deref().unwrap_or(from.name())),
            opts.no_progress_bar,
        );
        let report = |current: u64, total: Option<u64>| progress.update_to(current, total);
        let result = service
            .download_file(from.bucket(), from.path(), to, &report)
            .await;
        progress.finish();
        Ok(result?)
    }

    async fn copy(&self, from: &RemotePath, to: &RemotePath) -> Result<()> {
        check_addressable(from)?;
        check_addressable(to)?;
        let service = self.blob_service().await?;
        let source = service.blob_url(from.bucket(), from.path())?;
        service.copy_blob(to.bucket(), to.path(), &source).await?;
        debug!(from = %from, to = %to, "Copy started");
        Ok(())
    }

    async fn remove(&self, path: &RemotePath) -> Result<()> {
        if path.scheme() != SCHEME {
            return Err(TreeError::NotSupported(format!(
                "cannot remove `{path}` through an {SCHEME} tree"
            )));
        }

        check_addressable(path)?;

        debug!("Removing {path}");
        let service = self.blob_service().await?;
        service.delete_blob(path.bucket(), path.path()).await?;
        Ok(())
    }

    async fn generate_download_url(
        &self,
        path: &RemotePath,
        expires: Duration,
    ) -> Result<String> {
        let expires = chrono::Duration::from_std(expires)
            .map_err(|e| TreeError::Config(format!("invalid URL expiry {expires:?}: {e}")))?;
        check_addressable(path)?;
        let service = self.blob_service().await?;
        let url = service
            .signed_url(path.bucket(), path.path(), Utc::now() + expires)
            .await?;
        Ok(url.to_string())
    }
}
