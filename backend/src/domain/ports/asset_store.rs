//! Port for staging, serving, and removing listing images.

use async_trait::async_trait;

use crate::domain::{AssetId, UploadedImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset store adapters.
    pub enum AssetStoreError {
        /// Writing a staged file failed.
        Write { asset: String, message: String } =>
            "failed to write asset {asset}: {message}",
        /// Reading a stored file failed.
        Read { asset: String, message: String } =>
            "failed to read asset {asset}: {message}",
        /// Removing a file failed for a reason other than it being absent.
        Delete { asset: String, message: String } =>
            "failed to delete asset {asset}: {message}",
    }
}

/// File storage for listing images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write an image under a fresh identifier.
    async fn stage(&self, image: UploadedImage) -> Result<AssetId, AssetStoreError>;

    /// Remove an image. A missing file is not an error.
    async fn delete(&self, asset: &AssetId) -> Result<(), AssetStoreError>;

    /// Read a stored image, or `None` when it does not exist.
    async fn read(&self, asset: &AssetId) -> Result<Option<Vec<u8>>, AssetStoreError>;
}
