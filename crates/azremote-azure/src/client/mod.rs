//! [`BlobService`] on top of the Azure storage SDK.

mod body;
mod transfer;

use std::num::NonZeroU32;
use std::path::Path;

use async_trait::async_trait;
use azure_core::Url;
use azure_core::error::{Error, ErrorKind};
use azure_core::prelude::MaxResults;
use azure_storage::shared_access_signature::service_sas::BlobSasPermissions;
use azure_storage_blobs::prelude::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::service::{
    BlobPage, BlobProperties, BlobService, ListRequest, ProgressFn, ServiceError,
};

/// One storage account, reached through a [`BlobServiceClient`].
#[derive(Clone)]
pub struct SdkBlobService {
    service: BlobServiceClient,
}

impl SdkBlobService {
    pub fn new(service: BlobServiceClient) -> Self {
        Self { service }
    }

    fn container(&self, container: &str) -> ContainerClient {
        self.service.container_client(container)
    }

    fn blob(&self, container: &str, blob: &str) -> BlobClient {
        self.container(container).blob_client(blob)
    }
}

/// `Ok(None)` for a 404, the mapped error otherwise.
fn none_if_missing<T>(operation: &'static str, err: Error) -> Result<Option<T>, ServiceError> {
    match ServiceError::from_azure(operation, err) {
        e if e.is_not_found() => Ok(None),
        e => Err(e),
    }
}

#[async_trait]
impl BlobService for SdkBlobService {
    fn list_blobs(
        &self,
        request: ListRequest<'_>,
    ) -> BoxStream<'static, Result<BlobPage, ServiceError>> {
        let mut builder = self.container(request.container).list_blobs();
        if !request.prefix.is_empty() {
            builder = builder.prefix(request.prefix.to_string());
        }
        if let Some(max_results) = request.max_results.and_then(NonZeroU32::new) {
            builder = builder.max_results(MaxResults::new(max_results));
        }
        if let Some(delimiter) = request.delimiter {
            builder = builder.delimiter(delimiter.to_string());
        }

        builder
            .into_stream()
            .map_ok(|page| BlobPage {
                names: page.blobs.blobs().map(|blob| blob.name.clone()).collect(),
            })
            .map_err(|e| ServiceError::from_azure("list blobs", e))
            .boxed()
    }

    async fn create_container(&self, container: &str) -> Result<(), ServiceError> {
        match self.container(container).create().await {
            Ok(_) => {
                info!(container, "Created container");
                Ok(())
            }
            Err(e) => match ServiceError::from_azure("create container", e) {
                e if e.is_conflict() => {
                    debug!(container, "Container already exists");
                    Ok(())
                }
                e => Err(e),
            },
        }
    }

    async fn blob_exists(&self, container: &str, blob: &str) -> Result<bool, ServiceError> {
        if !blob.is_empty() {
            return Ok(self.blob_properties(container, blob).await?.is_some());
        }
        let found = match self.container(container).get_properties().await {
            Ok(_) => Some(()),
            Err(e) => none_if_missing("get container properties", e)?,
        };
        Ok(found.is_some())
    }

    async fn blob_properties(
        &self,
        container: &str,
        blob: &str,
    ) -> Result<Option<BlobProperties>, ServiceError> {
        match self.blob(container, blob).get_properties().await {
            Ok(response) => Ok(Some(BlobProperties {
                content_md5: response
                    .blob
                    .properties
                    .content_md5
                    .map(|md5| BASE64_STANDARD.encode(md5.bytes())),
            })),
            Err(e) => none_if_missing("get blob properties", e),
        }
    }

    async fn upload_file(
        &self,
        container: &str,
        blob: &str,
        from: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<(), ServiceError> {
        transfer::upload(&self.blob(container, blob), blob, from, progress).await
    }

    async fn download_file(
        &self,
        container: &str,
        blob: &str,
        to: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<(), ServiceError> {
        transfer::download(&self.blob(container, blob), to, progress).await
    }

    async fn copy_blob(
        &self,
        container: &str,
        blob: &str,
        source: &Url,
    ) -> Result<(), ServiceError> {
        let response = self
            .blob(container, blob)
            .copy(source.clone())
            .await
            .map_err(|e| ServiceError::from_azure("copy blob", e))?;
        debug!(
            container,
            blob,
            copy_id = ?response.copy_id,
            status = ?response.copy_status,
            "Copy accepted"
        );
        Ok(())
    }

    async fn delete_blob(&self, container: &str, blob: &str) -> Result<(), ServiceError> {
        self.blob(container, blob)
            .delete()
            .await
            .map_err(|e| ServiceError::from_azure("delete blob", e))?;
        Ok(())
    }

    fn blob_url(&self, container: &str, blob: &str) -> Result<Url, ServiceError> {
        self.blob(container, blob)
            .url()
            .map_err(|e| ServiceError::from_azure("blob url", e))
    }

    async fn signed_url(
        &self,
        container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Url, ServiceError> {
        let expiry = OffsetDateTime::from_unix_timestamp(expiry.timestamp())
            .map_err(|e| Error::new(ErrorKind::DataConversion, e))
            .map_err(|e| ServiceError::from_azure("sign url", e))?;
        let permissions = BlobSasPermissions {
            read: true,
            ..Default::default()
        };

        let client = self.blob(container, blob);
        let signature = client
            .shared_access_signature(permissions, expiry)
            .await
            .map_err(|e| ServiceError::from_azure("sign url", e))?;
        client
            .generate_signed_blob_url(&signature)
            .map_err(|e| ServiceError::from_azure("sign url", e))
    }
}
