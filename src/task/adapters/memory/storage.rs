//! In-memory asset and upload stores.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AssetName, TaskId},
    ports::{AssetStore, AssetStoreError, AssetStoreResult, UploadStore, asset_ref, upload_key},
};

const MEMORY_BASE: &str = "memory://";

#[derive(Debug, Default)]
struct AssetState {
    assets: HashMap<(TaskId, String), Vec<u8>>,
    writes: usize,
}

/// Asset store keeping bytes in memory and counting writes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetStore {
    state: Arc<RwLock<AssetState>>,
}

impl InMemoryAssetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many writes the store has accepted.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the state lock is poisoned.
    pub fn write_count(&self) -> AssetStoreResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.writes)
    }

    /// Returns whether `name` exists under `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the state lock is poisoned.
    pub fn contains(&self, task_id: TaskId, name: &AssetName) -> AssetStoreResult<bool> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .assets
            .contains_key(&(task_id, name.as_str().to_owned())))
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn write(
        &self,
        task_id: TaskId,
        name: &AssetName,
        bytes: &[u8],
    ) -> AssetStoreResult<String> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state
            .assets
            .insert((task_id, name.as_str().to_owned()), bytes.to_vec());
        state.writes = state.writes.saturating_add(1);
        Ok(asset_ref(MEMORY_BASE, task_id, name))
    }

    async fn read(&self, task_id: TaskId, name: &AssetName) -> AssetStoreResult<Vec<u8>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        state
            .assets
            .get(&(task_id, name.as_str().to_owned()))
            .cloned()
            .ok_or_else(|| AssetStoreError::NotFound(format!("{task_id}/{name}")))
    }
}

/// Upload store backed by a map of object keys.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUploadStore {
    uploads: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryUploadStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `key`, which may carry an `uploads/` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the state lock is poisoned.
    pub fn insert(&self, key: &str, bytes: Vec<u8>) -> AssetStoreResult<()> {
        let mut uploads = self.uploads.write().map_err(|err| lock_error(&err))?;
        uploads.insert(upload_key(key).to_owned(), bytes);
        Ok(())
    }
}

#[async_trait]
impl UploadStore for InMemoryUploadStore {
    async fn read(&self, source_ref: &str) -> AssetStoreResult<Vec<u8>> {
        let key = upload_key(source_ref);
        let uploads = self.uploads.read().map_err(|err| lock_error(&err))?;
        uploads
            .get(key)
            .cloned()
            .ok_or_else(|| AssetStoreError::NotFound(key.to_owned()))
    }
}

fn lock_error(err: &impl std::fmt::Display) -> AssetStoreError {
    AssetStoreError::io(std::io::Error::other(err.to_string()))
}
