use crate::error::Result;
use crate::image_check::{extension_for, sniff_logo};
use crate::{check_key, new_logo_key, AssetStore, StoredAsset};
use appreg_models::LogoUpload;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory logos are written to
    pub media_root: PathBuf,

    /// Public URL prefix the media root is served under
    pub media_url: String,

    pub default_logo_uri: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("./media"),
            media_url: "/media".to_string(),
            default_logo_uri: "/static/default-logo.png".to_string(),
        }
    }
}

/// Asset store writing logos below a local directory
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    config: StorageConfig,
}

impl FsAssetStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn uri_for(&self, key: &str) -> String {
        format!("{}/{}", self.config.media_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn put(&self, upload: &LogoUpload) -> Result<StoredAsset> {
        let format = sniff_logo(upload)?;
        let key = new_logo_key(extension_for(format));
        let path = self.config.media_root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.data).await?;

        tracing::debug!("Stored logo {} ({} bytes)", key, upload.data.len());

        Ok(StoredAsset {
            uri: self.uri_for(&key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;

        match tokio::fs::remove_file(self.config.media_root.join(key)).await {
            Ok(()) => {
                tracing::debug!("Deleted logo {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn default_logo_uri(&self) -> &str {
        &self.config.default_logo_uri
    }
}
