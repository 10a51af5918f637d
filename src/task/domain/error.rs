//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or mutating task domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a 128-bit hex or hyphenated UUID.
    #[error("invalid task id: {0}")]
    InvalidTaskId(String),

    /// A color name contains characters outside `[a-z0-9_-]` or is empty.
    #[error("invalid color name: {0}")]
    InvalidColor(String),

    /// The baseline was already recorded for this task.
    #[error("baseline already recorded for task {0}")]
    BaselineAlreadySet(TaskId),

    /// The operation needs a baseline that has not been produced yet.
    #[error("task {0} has no baseline")]
    MissingBaseline(TaskId),

    /// Completion was requested before the color variant existed.
    #[error("task {task_id} has no variant for color {color}")]
    MissingVariant {
        /// Task being completed.
        task_id: TaskId,
        /// Color whose variant is missing.
        color: String,
    },

    /// The task is not in a state that permits the transition.
    #[error("task {task_id} is {status}, expected {expected}")]
    InvalidStatus {
        /// Task being mutated.
        task_id: TaskId,
        /// Current status name.
        status: &'static str,
        /// Status the transition requires.
        expected: &'static str,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
