//! Application services for the task pipeline.

mod compositor;
mod error;
mod locks;
mod payload;
mod pipeline;

pub use compositor::{CompositorError, render_layout};
pub use error::{PipelineFailure, PipelineStage, TaskPipelineError, TaskPipelineResult};
pub use payload::{PayloadError, decode_image_payload};
pub use pipeline::{
    CreateTaskRequest, ExtendLayoutRequest, LayoutRendering, ParseLayoutRenderingError,
    PipelineSettings, TaskPipelineService,
};
