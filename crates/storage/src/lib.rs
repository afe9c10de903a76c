// Logo asset storage
// Stores uploaded client logos and hands back URIs the browser can load

pub mod error;
pub mod fs;
pub mod image_check;
pub mod memory;

pub use error::{Result, StorageError};
pub use fs::{FsAssetStore, StorageConfig};
pub use image_check::sniff_logo;
pub use memory::MemoryAssetStore;

use appreg_models::LogoUpload;
use async_trait::async_trait;

/// A logo written to the asset store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Store-specific key, used to delete the asset later
    pub key: String,

    /// URI under which the asset is served
    pub uri: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Write a logo and return where it lives. The upload must already have
    /// passed `sniff_logo`.
    async fn put(&self, upload: &LogoUpload) -> Result<StoredAsset>;

    /// Remove a stored logo. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// URI of the logo shown when a client has none of its own
    fn default_logo_uri(&self) -> &str;
}

/// Keys are generated here, never taken from user input
pub(crate) fn new_logo_key(extension: &str) -> String {
    format!("logos/{}.{}", uuid::Uuid::new_v4().simple(), extension)
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
