//! Port contracts for task persistence, asset storage and photo processing.

pub mod processor;
pub mod repository;
pub mod storage;

pub use processor::{
    CutoutResponse, PhotoProcessor, PhotoProcessorError, PhotoProcessorResult, RenderResponse,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use storage::{AssetStore, AssetStoreError, AssetStoreResult, UploadStore, asset_ref, upload_key};
