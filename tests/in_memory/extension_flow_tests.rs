//! Variant and print-sheet extensions through the wired application.

use super::helpers::{SOURCE_REF, TestApp, test_app};
use eyre::{Result, ensure};
use permit::task::adapters::memory::ProcessorOperation;
use permit::task::domain::{AssetName, ColorName};
use permit::task::ports::AssetStore;
use permit::task::services::{CreateTaskRequest, ExtendLayoutRequest, LayoutRendering};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extensions_accumulate_on_the_stored_task(test_app: TestApp) -> Result<()> {
    let TestApp {
        app,
        repositories,
        assets,
        processor,
        ..
    } = test_app;
    let task = app
        .pipeline
        .create_task(CreateTaskRequest::new("passport", SOURCE_REF).with_color("white"))
        .await?;

    let red = app.pipeline.extend_background(task.id(), "red", 0).await?;
    let sheet = app
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()).with_color("red"))
        .await?;

    let stored = repositories
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    ensure!(stored.variant_url(&ColorName::new("red")?) == Some(red.as_str()));
    ensure!(stored.layout_url("6inch") == Some(sheet.as_str()));
    ensure!(stored.processed_urls().len() == 2);
    ensure!(processor.call_count(ProcessorOperation::Recolor)? == 2);
    ensure!(processor.call_count(ProcessorOperation::ComposeLayout)? == 0);

    let bytes = assets.read(task.id(), &AssetName::layout("6inch")).await?;
    let decoded = image::load_from_memory(&bytes)?;
    ensure!((decoded.width(), decoded.height()) == (1800, 1200));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_rendering_uses_the_processor() -> Result<()> {
    let TestApp { app, processor, .. } = TestApp::new(LayoutRendering::Remote);
    let task = app
        .pipeline
        .create_task(CreateTaskRequest::new("cn_1inch", SOURCE_REF))
        .await?;

    let first = app
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()).with_target_kb(120))
        .await?;
    let second = app
        .pipeline
        .extend_layout(ExtendLayoutRequest::new(task.id()))
        .await?;

    ensure!(first == second);
    ensure!(processor.call_count(ProcessorOperation::ComposeLayout)? == 1);
    Ok(())
}
