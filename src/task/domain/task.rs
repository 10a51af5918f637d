//! Task aggregate root and its processing status.

use super::{ColorName, DEFAULT_COLOR, ParseTaskStatusError, TaskDomainError, TaskId, TaskSpec};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Processing status of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been accepted but no step has run.
    Queued,
    /// Pipeline steps are running.
    Processing,
    /// Baseline and requested variant are available.
    Done,
    /// A pipeline step failed; the payload is the reason.
    Failed(String),
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }

    /// Returns the failure reason for failed tasks.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            Self::Queued | Self::Processing | Self::Done => None,
        }
    }

    /// Rebuilds a status from its persisted name and error message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTaskStatusError`] for unknown status names.
    pub fn from_parts(status: &str, error_msg: Option<&str>) -> Result<Self, ParseTaskStatusError> {
        match status.trim().to_ascii_lowercase().as_str() {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed(error_msg.unwrap_or_default().to_owned())),
            _ => Err(ParseTaskStatusError(status.to_owned())),
        }
    }
}

/// Caller-supplied fields for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning user, `None` for anonymous tasks.
    pub owner: Option<UserId>,
    /// Resolved output geometry.
    pub spec: TaskSpec,
    /// Reference to the uploaded source image.
    pub source_ref: String,
    /// Colors offered for this task.
    pub available_colors: Vec<ColorName>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    owner: Option<UserId>,
    spec: TaskSpec,
    source_ref: String,
    status: TaskStatus,
    baseline_url: Option<String>,
    processed_urls: BTreeMap<ColorName, String>,
    layout_urls: BTreeMap<String, String>,
    available_colors: Vec<ColorName>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner, if any.
    pub owner: Option<UserId>,
    /// Persisted output geometry.
    pub spec: TaskSpec,
    /// Persisted source reference.
    pub source_ref: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted baseline reference.
    pub baseline_url: Option<String>,
    /// Persisted color variant references.
    pub processed_urls: BTreeMap<ColorName, String>,
    /// Persisted layout references.
    pub layout_urls: BTreeMap<String, String>,
    /// Persisted available colors.
    pub available_colors: Vec<ColorName>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task in the `processing` status.
    ///
    /// A blank source reference is kept; reading the upload fails the task.
    #[must_use]
    pub fn new(new_task: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            owner: new_task.owner,
            spec: new_task.spec,
            source_ref: new_task.source_ref.trim().to_owned(),
            status: TaskStatus::Processing,
            baseline_url: None,
            processed_urls: BTreeMap::new(),
            layout_urls: BTreeMap::new(),
            available_colors: new_task.available_colors,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            owner: data.owner,
            spec: data.spec,
            source_ref: data.source_ref,
            status: data.status,
            baseline_url: data.baseline_url,
            processed_urls: data.processed_urls,
            layout_urls: data.layout_urls,
            available_colors: data.available_colors,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Returns the output geometry.
    #[must_use]
    pub const fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    /// Returns the source image reference.
    #[must_use]
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    /// Returns the processing status.
    #[must_use]
    pub const fn status(&self) -> &TaskStatus {
        &self.status
    }

    /// Returns the baseline reference, if produced.
    #[must_use]
    pub fn baseline_url(&self) -> Option<&str> {
        self.baseline_url.as_deref()
    }

    /// Returns the color variant references.
    #[must_use]
    pub const fn processed_urls(&self) -> &BTreeMap<ColorName, String> {
        &self.processed_urls
    }

    /// Returns the layout references keyed by layout kind.
    #[must_use]
    pub const fn layout_urls(&self) -> &BTreeMap<String, String> {
        &self.layout_urls
    }

    /// Returns the colors offered for this task.
    #[must_use]
    pub fn available_colors(&self) -> &[ColorName] {
        &self.available_colors
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the reference of the variant rendered on `color`.
    #[must_use]
    pub fn variant_url(&self, color: &ColorName) -> Option<&str> {
        self.processed_urls.get(color).map(String::as_str)
    }

    /// Returns the reference of the layout sheet of `kind`.
    #[must_use]
    pub fn layout_url(&self, kind: &str) -> Option<&str> {
        self.layout_urls.get(kind).map(String::as_str)
    }

    /// Picks the color to render when the caller may have left it blank.
    ///
    /// A blank request falls back to the first available color, then to
    /// `white`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidColor`] when the requested name is
    /// not a valid color name.
    pub fn choose_color(&self, requested: &str) -> Result<ColorName, TaskDomainError> {
        if !requested.trim().is_empty() {
            return ColorName::new(requested);
        }
        match self.available_colors.first() {
            Some(first) => Ok(first.clone()),
            None => ColorName::new(DEFAULT_COLOR),
        }
    }

    /// Records the background-removed cutout.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BaselineAlreadySet`] when a baseline exists.
    pub fn record_baseline(
        &mut self,
        url: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.baseline_url.is_some() {
            return Err(TaskDomainError::BaselineAlreadySet(self.id));
        }
        self.baseline_url = Some(url.into());
        self.touch(clock);
        Ok(())
    }

    /// Records the variant rendered on `color`.
    pub fn record_variant(&mut self, color: ColorName, url: impl Into<String>, clock: &impl Clock) {
        self.processed_urls.insert(color, url.into());
        self.touch(clock);
    }

    /// Records a layout sheet of `kind`.
    pub fn record_layout(
        &mut self,
        kind: impl Into<String>,
        url: impl Into<String>,
        clock: &impl Clock,
    ) {
        self.layout_urls.insert(kind.into(), url.into());
        self.touch(clock);
    }

    /// Marks a processing task as done.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] unless the task is
    /// processing, [`TaskDomainError::MissingBaseline`] without a baseline and
    /// [`TaskDomainError::MissingVariant`] without a variant for `color`.
    pub fn complete(&mut self, color: &ColorName, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Processing {
            return Err(self.status_error("processing"));
        }
        if self.baseline_url.is_none() {
            return Err(TaskDomainError::MissingBaseline(self.id));
        }
        if !self.processed_urls.contains_key(color) {
            return Err(TaskDomainError::MissingVariant {
                task_id: self.id,
                color: color.to_string(),
            });
        }
        self.status = TaskStatus::Done;
        self.touch(clock);
        Ok(())
    }

    /// Marks the task as failed with `reason`.
    pub fn fail(&mut self, reason: impl Into<String>, clock: &impl Clock) {
        self.status = TaskStatus::Failed(reason.into());
        self.touch(clock);
    }

    /// Checks that the task finished successfully.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] unless the task is done.
    pub fn ensure_done(&self) -> Result<(), TaskDomainError> {
        if self.status == TaskStatus::Done {
            Ok(())
        } else {
            Err(self.status_error("done"))
        }
    }

    /// Updates the latest-change timestamp.
    pub fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    const fn status_error(&self, expected: &'static str) -> TaskDomainError {
        TaskDomainError::InvalidStatus {
            task_id: self.id,
            status: self.status.as_str(),
            expected,
        }
    }
}
