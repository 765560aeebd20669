use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use azremote_core::TreeError;
use azure_core::error::ErrorKind;
use azure_core::{HttpClient, StatusCode, TransportOptions, Url};
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use thiserror::Error;

use crate::client::SdkBlobService;
use crate::config::ConnectionOptions;
use crate::credentials;

/// Byte progress callback: `(bytes_done, total_bytes)`.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(
        "{operation} failed with HTTP {status} ({})",
        code.as_deref().unwrap_or("no error code")
    )]
    Status {
        operation: &'static str,
        status: u16,
        code: Option<String>,
    },

    #[error("{operation} failed: {source}")]
    Azure {
        operation: &'static str,
        #[source]
        source: azure_core::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl ServiceError {
    /// Classify an SDK error: HTTP 404 becomes [`ServiceError::NotFound`],
    /// other HTTP failures keep their status and error code.
    pub fn from_azure(operation: &'static str, err: azure_core::Error) -> Self {
        let http = match err.kind() {
            ErrorKind::HttpResponse { status, error_code } => {
                Some((*status, error_code.clone()))
            }
            _ => None,
        };
        match http {
            Some((status, code)) if status == StatusCode::NotFound => {
                ServiceError::NotFound(code.unwrap_or_else(|| operation.to_string()))
            }
            Some((status, code)) => ServiceError::Status {
                operation,
                status: u16::from(status),
                code,
            },
            None => ServiceError::Azure {
                operation,
                source: err,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Status { status: 409, .. })
    }
}

impl From<ServiceError> for TreeError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Io(e) => TreeError::Io(e),
            ServiceError::Credentials(msg) => TreeError::Config(msg),
            other => TreeError::remote(other),
        }
    }
}

/// Parameters of a List Blobs call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRequest<'a> {
    pub container: &'a str,
    pub prefix: &'a str,
    pub max_results: Option<u32>,
    pub delimiter: Option<&'a str>,
}

/// Blob names of one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobPage {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobProperties {
    /// `Content-MD5` property, base64 of the raw digest.
    pub content_md5: Option<String>,
}

/// Primitive calls against one storage account.
#[async_trait]
pub trait BlobService: Send + Sync {
    /// Pages of a listing, fetched one at a time as the stream is pulled.
    /// The service follows continuation markers itself.
    fn list_blobs(
        &self,
        request: ListRequest<'_>,
    ) -> BoxStream<'static, Result<BlobPage, ServiceError>>;

    async fn create_container(&self, container: &str) -> Result<(), ServiceError>;

    /// An empty `blob` checks the container itself.
    async fn blob_exists(&self, container: &str, blob: &str) -> Result<bool, ServiceError>;

    /// `None` when the blob does not exist.
    async fn blob_properties(
        &self,
        container: &str,
        blob: &str,
    ) -> Result<Option<BlobProperties>, ServiceError>;

    async fn upload_file(
        &self,
        container: &str,
        blob: &str,
        from: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<(), ServiceError>;

    async fn download_file(
        &self,
        container: &str,
        blob: &str,
        to: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<(), ServiceError>;

    /// Start a server-side copy from `source` into `container/blob`.
    async fn copy_blob(
        &self,
        container: &str,
        blob: &str,
        source: &Url,
    ) -> Result<(), ServiceError>;

    async fn delete_blob(&self, container: &str, blob: &str) -> Result<(), ServiceError>;

    /// Unsigned URL of a blob.
    fn blob_url(&self, container: &str, blob: &str) -> Result<Url, ServiceError>;

    /// Read-only URL valid until `expiry`.
    async fn signed_url(
        &self,
        container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Url, ServiceError>;
}

/// Builds the [`BlobService`] a tree talks to.
pub trait Connector: Send + Sync {
    fn connect(&self, options: &ConnectionOptions) -> Result<Arc<dyn BlobService>, ServiceError>;
}

/// Connects through the Azure storage SDK.
#[derive(Clone, Default)]
pub struct SdkConnector {
    transport: Option<Arc<dyn HttpClient>>,
}

impl SdkConnector {
    /// Send every request through `http` instead of the SDK's default client.
    pub fn with_transport(http: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: Some(http),
        }
    }
}

impl fmt::Debug for SdkConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConnector")
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl Connector for SdkConnector {
    fn connect(&self, options: &ConnectionOptions) -> Result<Arc<dyn BlobService>, ServiceError> {
        let mut builder = credentials::client_builder(options)?;
        if let Some(http) = &self.transport {
            builder = builder.transport(TransportOptions::new(http.clone()));
        }
        Ok(Arc::new(SdkBlobService::new(builder.blob_service_client())))
    }
}
