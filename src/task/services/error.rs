//! Error types for the task pipeline.

use super::{compositor::CompositorError, payload::PayloadError};
use crate::error::ErrorKind;
use crate::task::{
    domain::{LayoutError, TaskDomainError, TaskId},
    ports::{AssetStoreError, PhotoProcessorError, TaskRepositoryError},
};
use std::fmt;
use thiserror::Error;

/// Photo processor stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Background removal.
    Cutout,
    /// Background recoloring.
    Recolor,
    /// Print sheet rendering.
    Layout,
}

impl PipelineStage {
    /// Returns the stage name used in failure reasons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cutout => "cutout",
            Self::Recolor => "recolor",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline step failure.
///
/// During task creation the display text becomes the persisted failure
/// reason.
#[derive(Debug, Error)]
pub enum PipelineFailure {
    /// The uploaded source image could not be read.
    #[error("source image unavailable: {0}")]
    Source(#[source] AssetStoreError),

    /// The photo processor could not be reached.
    #[error("{stage} request failed: {source}")]
    Transport {
        /// Stage being executed.
        stage: PipelineStage,
        /// Underlying processor error.
        source: PhotoProcessorError,
    },

    /// The photo processor answered with `ok = false`.
    #[error("{0} rejected by photo processor")]
    Rejected(PipelineStage),

    /// The processor payload is empty or not base64.
    #[error("invalid {stage} payload: {}", source.detail())]
    Payload {
        /// Stage being executed.
        stage: PipelineStage,
        /// Decoding error.
        source: PayloadError,
    },

    /// Reading or writing an asset failed.
    #[error("{stage} asset storage failed: {source}")]
    Storage {
        /// Stage being executed.
        stage: PipelineStage,
        /// Underlying store error.
        source: AssetStoreError,
    },

    /// Local sheet rendering failed.
    #[error(transparent)]
    Render(Box<CompositorError>),

    /// The task rejected a state change.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
}

impl From<CompositorError> for PipelineFailure {
    fn from(err: CompositorError) -> Self {
        Self::Render(Box::new(err))
    }
}

/// Service-level errors for task pipeline operations.
#[derive(Debug, Error)]
pub enum TaskPipelineError {
    /// Caller input or task state is invalid.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The requested task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The requested layout cannot be produced.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// An extension step failed.
    #[error(transparent)]
    Failure(#[from] PipelineFailure),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskPipelineError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::Layout(_) => ErrorKind::BadRequest,
            Self::NotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(TaskRepositoryError::DuplicateTask(_)) => ErrorKind::Conflict,
            Self::Failure(_) | Self::Repository(TaskRepositoryError::Persistence(_)) => {
                ErrorKind::ServerError
            }
        }
    }
}

/// Result type for task pipeline operations.
pub type TaskPipelineResult<T> = Result<T, TaskPipelineError>;
