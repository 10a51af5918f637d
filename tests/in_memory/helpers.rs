//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use permit::app::{Application, Collaborators, Repositories};
use permit::order::adapters::payment::SandboxPaymentGateway;
use permit::task::adapters::memory::{
    InMemoryAssetStore, InMemoryPhotoProcessor, InMemoryUploadStore,
};
use permit::task::services::{LayoutRendering, PipelineSettings};
use permit::testing::{ManualClock, sample_png};
use rstest::fixture;

/// Upload reference seeded into every test application.
pub const SOURCE_REF: &str = "uploads/portrait.png";

/// Application wired over in-memory adapters with handles to inspect them.
pub struct TestApp {
    /// Wired services.
    pub app: Application<ManualClock>,
    /// Repositories shared with the services.
    pub repositories: Repositories,
    /// Generated assets.
    pub assets: Arc<InMemoryAssetStore>,
    /// Scripted photo processor.
    pub processor: Arc<InMemoryPhotoProcessor>,
    /// Clock driving every service.
    pub clock: ManualClock,
}

impl TestApp {
    /// Wires a fresh application using `rendering` for layout sheets.
    ///
    /// # Panics
    ///
    /// Panics when the sample upload cannot be produced.
    #[must_use]
    pub fn new(rendering: LayoutRendering) -> Self {
        let repositories = Repositories::in_memory();
        let assets = Arc::new(InMemoryAssetStore::new());
        let uploads = Arc::new(InMemoryUploadStore::new());
        let processor = Arc::new(InMemoryPhotoProcessor::new());
        let clock = ManualClock::at_epoch();
        uploads
            .insert(SOURCE_REF, sample_png(354, 472).expect("sample image"))
            .expect("upload stored");

        let app = Application::with_collaborators(
            repositories.clone(),
            Collaborators {
                assets: Arc::<InMemoryAssetStore>::clone(&assets),
                uploads,
                processor: Arc::<InMemoryPhotoProcessor>::clone(&processor),
                gateway: Arc::new(SandboxPaymentGateway::new("wx-test-app")),
            },
            PipelineSettings {
                layout_rendering: rendering,
            },
            Arc::new(clock.clone()),
        );
        Self {
            app,
            repositories,
            assets,
            processor,
            clock,
        }
    }
}

/// Provides an application rendering sheets in process.
#[fixture]
pub fn test_app() -> TestApp {
    TestApp::new(LayoutRendering::Local)
}
