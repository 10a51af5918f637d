//! Shared fixtures for pipeline tests.

use std::sync::Arc;

use crate::task::{
    adapters::memory::{
        InMemoryAssetStore, InMemoryPhotoProcessor, InMemoryTaskRepository, InMemoryUploadStore,
    },
    services::{PipelineSettings, TaskPipelineService},
};
use crate::testing::{ManualClock, sample_png};

pub(super) type TestPipeline = TaskPipelineService<
    InMemoryTaskRepository,
    InMemoryAssetStore,
    InMemoryUploadStore,
    InMemoryPhotoProcessor,
    ManualClock,
>;

pub(super) const SOURCE_REF: &str = "uploads/face.png";

pub(super) struct Harness {
    pub(super) tasks: Arc<InMemoryTaskRepository>,
    pub(super) assets: Arc<InMemoryAssetStore>,
    pub(super) uploads: Arc<InMemoryUploadStore>,
    pub(super) processor: Arc<InMemoryPhotoProcessor>,
    pub(super) clock: Arc<ManualClock>,
    pub(super) pipeline: TestPipeline,
}

impl Harness {
    pub(super) fn new(settings: PipelineSettings) -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let assets = Arc::new(InMemoryAssetStore::new());
        let uploads = Arc::new(InMemoryUploadStore::new());
        let processor = Arc::new(InMemoryPhotoProcessor::new());
        let clock = Arc::new(ManualClock::at_epoch());
        uploads
            .insert(SOURCE_REF, sample_png(295, 413).expect("sample image"))
            .expect("upload stored");
        let pipeline = TaskPipelineService::new(
            Arc::clone(&tasks),
            Arc::clone(&assets),
            Arc::clone(&uploads),
            Arc::clone(&processor),
            Arc::clone(&clock),
        )
        .with_settings(settings);
        Self {
            tasks,
            assets,
            uploads,
            processor,
            clock,
            pipeline,
        }
    }
}
