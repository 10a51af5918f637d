//! Domain model for ID-photo tasks.

mod asset;
mod error;
mod ids;
mod layout;
mod spec;
mod task;

pub use asset::AssetName;
pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::TaskId;
pub use layout::{
    LAYOUT_GAP_PX, LayoutError, LayoutGrid, Placement, SIX_INCH_LAYOUT, SheetSize, TileSize,
    jpeg_quality,
};
pub use spec::{ColorName, DEFAULT_COLOR, DEFAULT_SPEC_CODE, PhotoSpec, SpecCatalog, TaskSpec};
pub use task::{NewTask, PersistedTaskData, Task, TaskStatus};
