//! Task pipeline orchestration.
//!
//! `create_task` runs the full cutout → variant sequence and folds any step
//! failure into the persisted task status. The extension operations add
//! variants and layout sheets to finished tasks; they are idempotent and
//! serialized per task within one process.

use super::{
    compositor::render_layout_blocking,
    error::{PipelineFailure, PipelineStage, TaskPipelineError, TaskPipelineResult},
    locks::TaskLocks,
    payload::decode_image_payload,
};
use crate::task::{
    domain::{
        AssetName, ColorName, LAYOUT_GAP_PX, LayoutGrid, NewTask, SIX_INCH_LAYOUT, SheetSize,
        SpecCatalog, Task, TaskDomainError, TaskId, TileSize, jpeg_quality,
    },
    ports::{AssetStore, PhotoProcessor, TaskRepository, TaskRepositoryError, UploadStore},
};
use crate::user::domain::UserId;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where layout sheets are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRendering {
    /// Render sheets in process.
    #[default]
    Local,
    /// Delegate rendering to the photo processor.
    Remote,
}

impl LayoutRendering {
    /// Returns the configuration name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl TryFrom<&str> for LayoutRendering {
    type Error = ParseLayoutRenderingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            _ => Err(ParseLayoutRenderingError(value.to_owned())),
        }
    }
}

/// Error returned for unknown layout rendering modes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown layout rendering mode: {0}")]
pub struct ParseLayoutRenderingError(pub String);

/// Tunables for the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Where layout sheets are rendered.
    pub layout_rendering: LayoutRendering,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    owner: Option<UserId>,
    spec_code: String,
    source_ref: String,
    color: String,
    width_px: u32,
    height_px: u32,
    dpi: u32,
    available_colors: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request for `source_ref` using the catalog geometry of
    /// `spec_code`.
    #[must_use]
    pub fn new(spec_code: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            owner: None,
            spec_code: spec_code.into(),
            source_ref: source_ref.into(),
            color: String::new(),
            width_px: 0,
            height_px: 0,
            dpi: 0,
            available_colors: Vec::new(),
        }
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the color of the first variant.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Overrides the catalog width and height; zero keeps the catalog value.
    #[must_use]
    pub const fn with_dimensions(mut self, width_px: u32, height_px: u32) -> Self {
        self.width_px = width_px;
        self.height_px = height_px;
        self
    }

    /// Overrides the catalog resolution; zero keeps the catalog value.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the colors offered for the task.
    #[must_use]
    pub fn with_available_colors(mut self, colors: impl IntoIterator<Item = String>) -> Self {
        self.available_colors = colors.into_iter().collect();
        self
    }
}

/// Request payload for producing a print sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendLayoutRequest {
    task_id: TaskId,
    color: String,
    width_px: u32,
    height_px: u32,
    dpi: u32,
    target_kb: u32,
}

impl ExtendLayoutRequest {
    /// Creates a request using the task's geometry and default color.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            color: String::new(),
            width_px: 0,
            height_px: 0,
            dpi: 0,
            target_kb: 0,
        }
    }

    /// Sets the variant color to tile.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Overrides the tile size; zero keeps the task value.
    #[must_use]
    pub const fn with_dimensions(mut self, width_px: u32, height_px: u32) -> Self {
        self.width_px = width_px;
        self.height_px = height_px;
        self
    }

    /// Overrides the sheet resolution; zero keeps the task value.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the desired file size in kilobytes; zero means no target.
    #[must_use]
    pub const fn with_target_kb(mut self, target_kb: u32) -> Self {
        self.target_kb = target_kb;
        self
    }
}

enum StepError {
    Failure(PipelineFailure),
    Repository(TaskRepositoryError),
}

impl From<PipelineFailure> for StepError {
    fn from(err: PipelineFailure) -> Self {
        Self::Failure(err)
    }
}

impl From<TaskDomainError> for StepError {
    fn from(err: TaskDomainError) -> Self {
        Self::Failure(err.into())
    }
}

impl From<TaskRepositoryError> for StepError {
    fn from(err: TaskRepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// ID-photo task pipeline service.
pub struct TaskPipelineService<R, A, U, P, C>
where
    R: TaskRepository + ?Sized,
    A: AssetStore + ?Sized,
    U: UploadStore + ?Sized,
    P: PhotoProcessor + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    assets: Arc<A>,
    uploads: Arc<U>,
    processor: Arc<P>,
    clock: Arc<C>,
    catalog: SpecCatalog,
    settings: PipelineSettings,
    locks: TaskLocks,
}

impl<R, A, U, P, C> Clone for TaskPipelineService<R, A, U, P, C>
where
    R: TaskRepository + ?Sized,
    A: AssetStore + ?Sized,
    U: UploadStore + ?Sized,
    P: PhotoProcessor + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            assets: Arc::clone(&self.assets),
            uploads: Arc::clone(&self.uploads),
            processor: Arc::clone(&self.processor),
            clock: Arc::clone(&self.clock),
            catalog: self.catalog,
            settings: self.settings,
            locks: self.locks.clone(),
        }
    }
}

impl<R, A, U, P, C> TaskPipelineService<R, A, U, P, C>
where
    R: TaskRepository + ?Sized,
    A: AssetStore + ?Sized,
    U: UploadStore + ?Sized,
    P: PhotoProcessor + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a pipeline with default settings.
    #[must_use]
    pub fn new(
        tasks: Arc<R>,
        assets: Arc<A>,
        uploads: Arc<U>,
        processor: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            assets,
            uploads,
            processor,
            clock,
            catalog: SpecCatalog,
            settings: PipelineSettings::default(),
            locks: TaskLocks::new(),
        }
    }

    /// Replaces the pipeline settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Creates a task and runs the cutout and first variant.
    ///
    /// Step failures do not produce an error: the returned task is `failed`
    /// with the reason recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPipelineError::Domain`] for invalid input and
    /// [`TaskPipelineError::Repository`] when progress cannot be persisted.
    #[tracing::instrument(skip(self, request), fields(spec = %request.spec_code))]
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskPipelineResult<Task> {
        let spec = self.catalog.resolve(
            &request.spec_code,
            request.width_px,
            request.height_px,
            request.dpi,
        );
        let available_colors = if request.available_colors.is_empty() {
            self.catalog
                .find(&spec.code)
                .colors
                .iter()
                .map(|name| ColorName::new(name))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            request
                .available_colors
                .iter()
                .map(|name| ColorName::new(name))
                .collect::<Result<Vec<_>, _>>()?
        };
        let mut task = Task::new(
            NewTask {
                owner: request.owner,
                spec,
                source_ref: request.source_ref,
                available_colors,
            },
            &*self.clock,
        );
        let color = task.choose_color(&request.color)?;
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), %color, "task created");

        match self.run_initial_steps(&mut task, &color).await {
            Ok(()) => {
                info!(task_id = %task.id(), "task completed");
                Ok(task)
            }
            Err(StepError::Failure(failure)) => {
                self.abandon(&mut task, &failure).await?;
                Ok(task)
            }
            Err(StepError::Repository(err)) => Err(err.into()),
        }
    }

    /// Returns the reference of the variant of `color`, rendering it when
    /// missing.
    ///
    /// A blank `color` selects the task's first available color; `dpi = 0`
    /// uses the task resolution.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPipelineError::NotFound`] for unknown tasks,
    /// [`TaskPipelineError::Domain`] when the task is not done and
    /// [`TaskPipelineError::Failure`] when rendering fails.
    #[tracing::instrument(skip(self), fields(task_id = %task_id))]
    pub async fn extend_background(
        &self,
        task_id: TaskId,
        color: &str,
        dpi: u32,
    ) -> TaskPipelineResult<String> {
        let _guard = self.locks.lock(task_id).await;
        self.extend_background_locked(task_id, color, dpi).await
    }

    /// Returns the reference of the 6-inch print sheet, producing it when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPipelineError::Layout`] when no tile fits the sheet and
    /// otherwise the errors of [`Self::extend_background`].
    #[tracing::instrument(skip(self, request), fields(task_id = %request.task_id))]
    pub async fn extend_layout(&self, request: ExtendLayoutRequest) -> TaskPipelineResult<String> {
        let task_id = request.task_id;
        let _guard = self.locks.lock(task_id).await;
        let existing = self.load(task_id).await?;
        if let Some(url) = existing.layout_url(SIX_INCH_LAYOUT) {
            debug!("layout already produced");
            return Ok(url.to_owned());
        }
        existing.ensure_done()?;

        let color = existing.choose_color(&request.color)?;
        let spec = existing.spec();
        let tile = TileSize {
            width: non_zero_or(request.width_px, spec.width_px),
            height: non_zero_or(request.height_px, spec.height_px),
        };
        let dpi = non_zero_or(request.dpi, spec.dpi);
        let grid = LayoutGrid::fit(SheetSize::six_by_four(dpi)?, tile, LAYOUT_GAP_PX)?;

        self.extend_background_locked(task_id, color.as_str(), dpi)
            .await?;
        let mut task = self.load(task_id).await?;
        let variant = self
            .assets
            .read(task_id, &AssetName::variant(&color))
            .await
            .map_err(|source| PipelineFailure::Storage {
                stage: PipelineStage::Layout,
                source,
            })?;

        let sheet = self.render_sheet(variant, grid, dpi, request.target_kb).await?;
        let url = self
            .assets
            .write(task_id, &AssetName::layout(SIX_INCH_LAYOUT), &sheet)
            .await
            .map_err(|source| PipelineFailure::Storage {
                stage: PipelineStage::Layout,
                source,
            })?;
        task.record_layout(SIX_INCH_LAYOUT, url.clone(), &*self.clock);
        self.tasks.update(&task).await?;
        info!(
            tiles = grid.tile_count(),
            mode = self.settings.layout_rendering.as_str(),
            "layout produced"
        );
        Ok(url)
    }

    /// Loads a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskPipelineError::NotFound`] when no task matches.
    pub async fn find_task(&self, task_id: TaskId) -> TaskPipelineResult<Task> {
        self.load(task_id).await
    }

    async fn run_initial_steps(&self, task: &mut Task, color: &ColorName) -> Result<(), StepError> {
        let source = self
            .uploads
            .read(task.source_ref())
            .await
            .map_err(PipelineFailure::Source)?;

        let reply = self
            .processor
            .cutout(&source, task.spec())
            .await
            .map_err(|source_err| PipelineFailure::Transport {
                stage: PipelineStage::Cutout,
                source: source_err,
            })?;
        let baseline = decode_reply(PipelineStage::Cutout, reply.ok, reply.preferred_payload())?;
        let baseline_url = self
            .assets
            .write(task.id(), &AssetName::baseline(), &baseline)
            .await
            .map_err(|source_err| PipelineFailure::Storage {
                stage: PipelineStage::Cutout,
                source: source_err,
            })?;
        task.record_baseline(baseline_url, &*self.clock)?;
        self.tasks.update(task).await?;

        let variant_url = self
            .render_variant(task.id(), &baseline, color, task.spec().dpi)
            .await?;
        task.record_variant(color.clone(), variant_url, &*self.clock);
        self.tasks.update(task).await?;

        task.complete(color, &*self.clock)?;
        self.tasks.update(task).await?;
        Ok(())
    }

    async fn extend_background_locked(
        &self,
        task_id: TaskId,
        color: &str,
        dpi: u32,
    ) -> TaskPipelineResult<String> {
        let mut task = self.load(task_id).await?;
        let chosen = task.choose_color(color)?;
        if let Some(url) = task.variant_url(&chosen) {
            debug!(color = %chosen, "variant already produced");
            return Ok(url.to_owned());
        }
        task.ensure_done()?;

        let baseline = self
            .assets
            .read(task_id, &AssetName::baseline())
            .await
            .map_err(|source| PipelineFailure::Storage {
                stage: PipelineStage::Recolor,
                source,
            })?;
        let effective_dpi = non_zero_or(dpi, task.spec().dpi);
        let url = self
            .render_variant(task_id, &baseline, &chosen, effective_dpi)
            .await?;
        task.record_variant(chosen.clone(), url.clone(), &*self.clock);
        self.tasks.update(&task).await?;
        info!(color = %chosen, "variant produced");
        Ok(url)
    }

    async fn render_variant(
        &self,
        task_id: TaskId,
        baseline: &[u8],
        color: &ColorName,
        dpi: u32,
    ) -> Result<String, PipelineFailure> {
        let reply = self
            .processor
            .recolor(baseline, color.hex(), dpi)
            .await
            .map_err(|source| PipelineFailure::Transport {
                stage: PipelineStage::Recolor,
                source,
            })?;
        let variant = decode_reply(PipelineStage::Recolor, reply.ok, reply.image_b64.as_deref())?;
        self.assets
            .write(task_id, &AssetName::variant(color), &variant)
            .await
            .map_err(|source| PipelineFailure::Storage {
                stage: PipelineStage::Recolor,
                source,
            })
    }

    async fn render_sheet(
        &self,
        variant: Vec<u8>,
        grid: LayoutGrid,
        dpi: u32,
        target_kb: u32,
    ) -> Result<Vec<u8>, PipelineFailure> {
        match self.settings.layout_rendering {
            LayoutRendering::Local => {
                Ok(render_layout_blocking(variant, grid, jpeg_quality(target_kb)).await?)
            }
            LayoutRendering::Remote => {
                let reply = self
                    .processor
                    .compose_layout(&variant, grid.tile(), dpi, target_kb)
                    .await
                    .map_err(|source| PipelineFailure::Transport {
                        stage: PipelineStage::Layout,
                        source,
                    })?;
                decode_reply(PipelineStage::Layout, reply.ok, reply.image_b64.as_deref())
            }
        }
    }

    async fn abandon(&self, task: &mut Task, failure: &PipelineFailure) -> TaskPipelineResult<()> {
        warn!(task_id = %task.id(), error = %failure, "task pipeline step failed");
        task.fail(failure.to_string(), &*self.clock);
        self.tasks.update(task).await?;
        Ok(())
    }

    async fn load(&self, task_id: TaskId) -> TaskPipelineResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskPipelineError::NotFound(task_id))
    }
}

fn decode_reply(
    stage: PipelineStage,
    ok: bool,
    payload: Option<&str>,
) -> Result<Vec<u8>, PipelineFailure> {
    if !ok {
        return Err(PipelineFailure::Rejected(stage));
    }
    decode_image_payload(payload).map_err(|source| PipelineFailure::Payload { stage, source })
}

const fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 { fallback } else { value }
}
