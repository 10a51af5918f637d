//! Ports for reading uploads and writing generated assets.

use crate::task::domain::{AssetName, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for asset and upload store operations.
pub type AssetStoreResult<T> = Result<T, AssetStoreError>;

/// Storage for files generated by a task.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Writes `bytes` as `name` under `task_id` and returns its reference.
    ///
    /// Writing an existing name replaces the previous content.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the bytes cannot be stored.
    async fn write(
        &self,
        task_id: TaskId,
        name: &AssetName,
        bytes: &[u8],
    ) -> AssetStoreResult<String>;

    /// Reads the asset `name` of `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::NotFound`] when the asset does not exist.
    async fn read(&self, task_id: TaskId, name: &AssetName) -> AssetStoreResult<Vec<u8>>;
}

/// Read access to uploaded source images.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Resolves a source reference to the uploaded bytes.
    ///
    /// References may carry an `uploads/` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::NotFound`] when nothing is stored under the
    /// reference.
    async fn read(&self, source_ref: &str) -> AssetStoreResult<Vec<u8>>;
}

/// Errors returned by asset and upload stores.
#[derive(Debug, Clone, Error)]
pub enum AssetStoreError {
    /// Nothing is stored under the key.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The key escapes the store root or is otherwise unusable.
    #[error("invalid asset key: {0}")]
    InvalidKey(String),

    /// Storage-layer failure.
    #[error("asset storage error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssetStoreError {
    /// Wraps a storage error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Strips the optional `uploads/` prefix from a source reference.
#[must_use]
pub fn upload_key(source_ref: &str) -> &str {
    let trimmed = source_ref.trim();
    trimmed.strip_prefix("uploads/").unwrap_or(trimmed)
}

/// Builds the public reference of an asset under `base`.
#[must_use]
pub fn asset_ref(base: &str, task_id: TaskId, name: &AssetName) -> String {
    format!("{}/assets/{task_id}/{name}", base.trim_end_matches('/'))
}
