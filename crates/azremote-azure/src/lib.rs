//! Azure Blob Storage remote for azremote.
//!
//! [`AzureTree`] implements the [`azremote_core::Tree`] capability set on top
//! of a [`BlobService`]. The production service, [`SdkBlobService`], drives
//! the `azure_storage_blobs` SDK (account key, SAS token, connection string or
//! anonymous auth); tests swap in their own service through a [`Connector`],
//! or their own HTTP transport through [`SdkConnector::with_transport`].

pub mod client;
pub mod config;
pub mod credentials;
pub mod service;
pub mod tree;

pub use client::SdkBlobService;
pub use config::{ConnectionOptions, PROFILE_SECTION};
pub use service::{
    BlobPage, BlobProperties, BlobService, Connector, ListRequest, ProgressFn, SdkConnector,
    ServiceError,
};
pub use tree::AzureTree;
