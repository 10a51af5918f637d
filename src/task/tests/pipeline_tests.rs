//! Tests for task creation and extension happy paths.

use std::sync::Arc;

use super::support::{Harness, SOURCE_REF};
use crate::task::{
    adapters::memory::ProcessorOperation,
    domain::{AssetName, ColorName, TaskStatus},
    ports::{AssetStore, TaskRepository},
    services::{CreateTaskRequest, ExtendLayoutRequest, LayoutRendering, PipelineSettings},
};
use crate::testing::sample_png;
use crate::user::domain::UserId;
use chrono::Duration;
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> Harness {
    Harness::new(PipelineSettings::default())
}

fn one_inch_white() -> CreateTaskRequest {
    CreateTaskRequest::new("cn_1inch", SOURCE_REF)
        .with_color("white")
        .with_dimensions(295, 413)
        .with_dpi(300)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_produces_baseline_and_requested_variant(harness: Harness) {
    let owner = UserId::new("user-1").expect("valid user");

    let task = harness
        .pipeline
        .create_task(one_inch_white().with_owner(owner.clone()))
        .await
        .expect("pipeline runs");

    assert_eq!(task.status(), &TaskStatus::Done);
    assert_eq!(task.owner(), Some(&owner));
    let white = ColorName::new("white").expect("valid color");
    let expected_baseline = format!("memory://assets/{}/baseline.png", task.id());
    let expected_variant = format!("memory://assets/{}/white.jpg", task.id());
    assert_eq!(task.baseline_url(), Some(expected_baseline.as_str()));
    assert_eq!(task.variant_url(&white), Some(expected_variant.as_str()));
    assert_eq!(
        harness.processor.recolor_requests().expect("requests"),
        vec!["ffffff".to_owned()]
    );

    let stored = harness
        .tasks
        .find_by_id(task.id())
        .await
        .expect("lookup")
        .expect("task persisted");
    assert_eq!(stored, task);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_color_uses_first_available_color(harness: Harness) {
    let request = CreateTaskRequest::new("cn_1inch", SOURCE_REF)
        .with_available_colors(["blue".to_owned(), "red".to_owned()]);

    let task = harness.pipeline.create_task(request).await.expect("pipeline runs");

    assert_eq!(task.status(), &TaskStatus::Done);
    let blue = ColorName::new("blue").expect("valid color");
    assert!(task.variant_url(&blue).is_some());
    assert_eq!(
        harness.processor.recolor_requests().expect("requests"),
        vec!["638cce".to_owned()]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn catalog_supplies_geometry_and_colors(harness: Harness) {
    let task = harness
        .pipeline
        .create_task(CreateTaskRequest::new("cn_2inch", SOURCE_REF))
        .await
        .expect("pipeline runs");

    assert_eq!((task.spec().width_px, task.spec().height_px), (413, 579));
    assert_eq!(task.spec().dpi, 300);
    assert_eq!(task.available_colors().len(), 8);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extend_background_is_idempotent(harness: Harness) {
    let task = harness
        .pipeline
        .create_task(one_inch_white())
        .await
        .expect("pipeline runs");
    let writes_before = harness.assets.write_count().expect("count");

    let url = harness
        .pipeline
        .extend_background(task.id(), "white", 0)
        .await
        .expect("existing variant");

    assert_eq!(task.variant_url(&ColorName::new("white").expect("color")), Some(url.as_str()));
    assert_eq!(
        harness
            .processor
            .call_count(ProcessorOperation::Recolor)
            .expect("count"),
        1
    );
    assert_eq!(harness.assets.write_count().expect("count"), writes_before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extend_background_renders_new_color_once(harness: Harness) {
    let task = harness
        .pipeline
        .create_task(one_inch_white())
        .await
        .expect("pipeline runs");
    harness.clock.advance(Duration::minutes(1));

    let first = harness
        .pipeline
        .extend_background(task.id(), "blue", 0)
        .await
        .expect("variant rendered");
    let second = harness
        .pipeline
        .extend_background(task.id(), "BLUE", 0)
        .await
        .expect("variant reused");

    assert_eq!(first, second);
    assert!(first.ends_with("/blue.jpg"));
    assert_eq!(
        harness.processor.recolor_requests().expect("requests"),
        vec!["ffffff".to_owned(), "638cce".to_owned()]
    );
    let stored = harness
        .pipeline
        .find_task(task.id())
        .await
        .expect("task exists");
    assert_eq!(stored.processed_urls().len(), 2);
    assert_eq!(stored.updated_at(), task.updated_at() + Duration::minutes(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_extensions_render_a_color_once(harness: Harness) {
    let task = harness
        .pipeline
        .create_task(one_inch_white())
        .await
        .expect("pipeline runs");
    let left = harness.pipeline.clone();
    let right = harness.pipeline.clone();

    let (first, second) = tokio::join!(
        left.extend_background(task.id(), "red", 0),
        right.extend_background(task.id(), "red", 0)
    );

    assert_eq!(first.expect("first"), second.expect("second"));
    assert_eq!(
        harness
            .processor
            .call_count(ProcessorOperation::Recolor)
            .expect("count"),
        2
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extend_layout_renders_six_inch_sheet(harness: Harness) {
    harness
        .uploads
        .insert("passport.png", sample_png(354, 472).expect("sample"))
        .expect("upload stored");
    let task = harness
        .pipeline
        .create_task(CreateTaskRequest::new("passport", "passport.png").with_color("white"))
        .await
        .expect("pipeline runs");

    let url = harness
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()).with_color("white"))
        .await
        .expect("layout rendered");

    assert!(url.ends_with("/layout_6inch.jpg"));
    let sheet = harness
        .assets
        .read(task.id(), &AssetName::layout("6inch"))
        .await
        .expect("sheet stored");
    let decoded = image::load_from_memory(&sheet).expect("valid jpeg");
    assert_eq!((decoded.width(), decoded.height()), (1800, 1200));

    let writes_before = harness.assets.write_count().expect("count");
    let again = harness
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()))
        .await
        .expect("layout reused");
    assert_eq!(again, url);
    assert_eq!(harness.assets.write_count().expect("count"), writes_before);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extend_layout_renders_missing_variant_first(harness: Harness) {
    let task = harness
        .pipeline
        .create_task(one_inch_white())
        .await
        .expect("pipeline runs");

    harness
        .pipeline
        .extend_layout(
            ExtendLayoutRequest::new(task.id())
                .with_color("red")
                .with_target_kb(150),
        )
        .await
        .expect("layout rendered");

    let stored = harness
        .pipeline
        .find_task(task.id())
        .await
        .expect("task exists");
    assert!(stored
        .variant_url(&ColorName::new("red").expect("color"))
        .is_some());
    assert!(stored.layout_url("6inch").is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_layout_mode_delegates_rendering() {
    let harness = Harness::new(PipelineSettings {
        layout_rendering: LayoutRendering::Remote,
    });
    let task = harness
        .pipeline
        .create_task(one_inch_white())
        .await
        .expect("pipeline runs");

    let url = harness
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()))
        .await
        .expect("layout rendered remotely");

    assert!(url.ends_with("/layout_6inch.jpg"));
    assert_eq!(
        harness
            .processor
            .call_count(ProcessorOperation::ComposeLayout)
            .expect("count"),
        1
    );
    let shared = Arc::clone(&harness.assets);
    assert!(shared
        .contains(task.id(), &AssetName::layout("6inch"))
        .expect("lookup"));
}
