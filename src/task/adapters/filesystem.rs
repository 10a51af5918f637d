//! Filesystem asset and upload stores.
//!
//! Both stores confine access to their root directory through `cap-std`, so
//! keys containing `..` or absolute paths cannot escape it. Disk access runs
//! on the blocking thread pool.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;

use crate::task::{
    domain::{AssetName, TaskId},
    ports::{AssetStore, AssetStoreError, AssetStoreResult, UploadStore, asset_ref, upload_key},
};

/// Asset store writing to `<root>/<task id>/<name>`.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: Utf8PathBuf,
    public_base: String,
}

impl FsAssetStore {
    /// Opens the store, creating `root` when it does not exist.
    ///
    /// References returned by [`AssetStore::write`] are
    /// `<public_base>/assets/<task id>/<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the root cannot be created.
    pub fn open(
        root: impl Into<Utf8PathBuf>,
        public_base: impl Into<String>,
    ) -> AssetStoreResult<Self> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority()).map_err(AssetStoreError::io)?;
        Ok(Self {
            root: root_path,
            public_base: public_base.into(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn write(
        &self,
        task_id: TaskId,
        name: &AssetName,
        bytes: &[u8],
    ) -> AssetStoreResult<String> {
        let root = self.root.clone();
        let task_dir = task_id.to_string();
        let file_name = name.as_str().to_owned();
        let contents = bytes.to_vec();
        run_blocking(move || {
            let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
            dir.create_dir_all(&task_dir)?;
            let target = dir.open_dir(&task_dir)?;
            target.write(&file_name, contents)
        })
        .await
        .map_err(|err| map_io_error(err, format!("{task_id}/{name}")))?;
        Ok(asset_ref(&self.public_base, task_id, name))
    }

    async fn read(&self, task_id: TaskId, name: &AssetName) -> AssetStoreResult<Vec<u8>> {
        let root = self.root.clone();
        let relative = format!("{task_id}/{name}");
        let lookup = relative.clone();
        run_blocking(move || {
            let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
            dir.read(&lookup)
        })
        .await
        .map_err(|err| map_io_error(err, relative))
    }
}

/// Upload store reading object keys below a root directory.
#[derive(Debug, Clone)]
pub struct FsUploadStore {
    root: Utf8PathBuf,
}

impl FsUploadStore {
    /// Opens the store, creating `root` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssetStoreError::Io`] when the root cannot be created.
    pub fn open(root: impl Into<Utf8PathBuf>) -> AssetStoreResult<Self> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority()).map_err(AssetStoreError::io)?;
        Ok(Self { root: root_path })
    }
}

#[async_trait]
impl UploadStore for FsUploadStore {
    async fn read(&self, source_ref: &str) -> AssetStoreResult<Vec<u8>> {
        let key = upload_key(source_ref).to_owned();
        if key.is_empty() {
            return Err(AssetStoreError::InvalidKey(source_ref.to_owned()));
        }
        let root = self.root.clone();
        let lookup = key.clone();
        run_blocking(move || {
            let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
            dir.read(&lookup)
        })
        .await
        .map_err(|err| map_io_error(err, key))
    }
}

async fn run_blocking<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(io::Error::other)?
}

fn map_io_error(err: io::Error, key: String) -> AssetStoreError {
    match err.kind() {
        io::ErrorKind::NotFound => AssetStoreError::NotFound(key),
        io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => {
            AssetStoreError::InvalidKey(key)
        }
        _ => AssetStoreError::io(err),
    }
}
