//! Logo lifecycle tied to client record writes.
//!
//! Changing a logo happens in three steps, always in this order:
//!
//! 1. **stage**: write the new asset, if there is one
//! 2. **commit**: write the client record pointing at the new logo
//! 3. **finalize**: delete the asset the record no longer points at
//!
//! If the record write fails the staged asset is deleted again and the
//! stored record keeps pointing at its old, still existing asset. A failure
//! while deleting an old asset only leaves an orphan file behind and is
//! logged, never surfaced to the caller.

use crate::error::Result;
use appreg_database::DatabaseError;
use appreg_models::{LogoUpload, OAuthClient};
use appreg_storage::{AssetStore, StoredAsset};
use std::future::Future;

/// Requested change to a client's logo
#[derive(Debug, Clone, Copy)]
pub enum LogoChange<'u> {
    /// Leave the logo as it is
    Keep,

    /// Store this upload and use it from now on
    Replace(&'u LogoUpload),

    /// Drop the stored logo and fall back to the default one
    Reset,
}

/// An in-flight logo change, between staging and commit
pub struct LogoSaga<'a> {
    assets: &'a dyn AssetStore,
    staged: Option<StoredAsset>,
    superseded: Option<String>,
}

impl<'a> LogoSaga<'a> {
    /// Step 1. Writes the new asset (if any) and points `client` at the logo
    /// it should have once committed. Nothing is deleted yet.
    pub async fn stage(
        assets: &'a dyn AssetStore,
        change: LogoChange<'_>,
        client: &mut OAuthClient,
    ) -> Result<Self> {
        let previous = client.logo_key.clone();

        let saga = match change {
            LogoChange::Keep => Self {
                assets,
                staged: None,
                superseded: None,
            },
            LogoChange::Replace(upload) => {
                let asset = assets.put(upload).await?;
                client.logo_uri = asset.uri.clone();
                client.logo_key = Some(asset.key.clone());

                Self {
                    assets,
                    staged: Some(asset),
                    superseded: previous,
                }
            }
            LogoChange::Reset => {
                client.logo_uri = assets.default_logo_uri().to_string();
                client.logo_key = None;

                Self {
                    assets,
                    staged: None,
                    superseded: previous,
                }
            }
        };

        Ok(saga)
    }

    /// Steps 2 and 3. Runs the record write, then cleans up whichever asset
    /// lost: the superseded one on success, the staged one on failure.
    pub async fn commit<T, F>(self, write: F) -> Result<T>
    where
        F: Future<Output = appreg_database::Result<T>>,
    {
        match write.await {
            Ok(value) => {
                self.finalize().await;
                Ok(value)
            }
            Err(err) => {
                self.rollback(&err).await;
                Err(err.into())
            }
        }
    }

    async fn finalize(self) {
        if let Some(key) = self.superseded {
            if let Err(e) = self.assets.delete(&key).await {
                tracing::warn!("Failed to delete superseded logo {}: {}", key, e);
            }
        }
    }

    async fn rollback(self, cause: &DatabaseError) {
        if let Some(asset) = self.staged {
            tracing::warn!("Record write failed ({}), removing staged logo {}", cause, asset.key);
            if let Err(e) = self.assets.delete(&asset.key).await {
                tracing::warn!("Failed to remove staged logo {}, left orphaned: {}", asset.key, e);
            }
        }
    }
}
