use crate::error::Result;
use crate::image_check::{extension_for, sniff_logo};
use crate::{check_key, new_logo_key, AssetStore, StoredAsset};
use appreg_models::LogoUpload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Asset store keeping logos in memory
#[derive(Clone)]
pub struct MemoryAssetStore {
    assets: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    default_logo_uri: String,
}

impl MemoryAssetStore {
    pub fn new(default_logo_uri: impl Into<String>) -> Self {
        Self {
            assets: Arc::new(RwLock::new(HashMap::new())),
            default_logo_uri: default_logo_uri.into(),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.assets.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn put(&self, upload: &LogoUpload) -> Result<StoredAsset> {
        let format = sniff_logo(upload)?;
        let key = new_logo_key(extension_for(format));

        self.assets
            .write()
            .await
            .insert(key.clone(), upload.data.clone());

        Ok(StoredAsset {
            uri: format!("memory://{}", key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;
        self.assets.write().await.remove(key);
        Ok(())
    }

    fn default_logo_uri(&self) -> &str {
        &self.default_logo_uri
    }
}
