//! In-memory adapters for task persistence, storage and processing.

mod processor;
mod storage;
mod task;

pub use processor::{InMemoryPhotoProcessor, ProcessorOperation, ScriptedFault};
pub use storage::{InMemoryAssetStore, InMemoryUploadStore};
pub use task::InMemoryTaskRepository;
