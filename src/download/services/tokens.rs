//! Issuing, redeeming and revoking download tokens.

use crate::download::{
    domain::{DownloadDomainError, DownloadToken, Redemption, TokenValue},
    ports::{DownloadTokenRepository, DownloadTokenRepositoryError},
};
use crate::error::ErrorKind;
use crate::task::{
    domain::{TaskDomainError, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use crate::user::domain::{UserDomainError, UserId};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for download token operations.
#[derive(Debug, Error)]
pub enum DownloadTokenError {
    /// Token input or lifecycle rule rejected.
    #[error(transparent)]
    Domain(#[from] DownloadDomainError),

    /// The caller id is invalid.
    #[error(transparent)]
    User(#[from] UserDomainError),

    /// The task id is blank.
    #[error("task id must not be empty")]
    EmptyTaskId,

    /// The task does not exist or the id is malformed.
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// The task is not ready for download.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// The task belongs to another user.
    #[error("task {task_id} is not owned by {user_id}")]
    OwnerMismatch {
        /// Requested task.
        task_id: TaskId,
        /// Caller.
        user_id: UserId,
    },

    /// No token has this value.
    #[error("download token not found: {0}")]
    NotFound(TokenValue),

    /// The token was redeemed after its deadline.
    #[error("download token expired: {0}")]
    Expired(TokenValue),

    /// Token repository operation failed.
    #[error(transparent)]
    Repository(#[from] DownloadTokenRepositoryError),

    /// Task lookup failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),
}

impl DownloadTokenError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(DownloadDomainError::NotActive { .. })
            | Self::Repository(DownloadTokenRepositoryError::DuplicateToken(_)) => {
                ErrorKind::Conflict
            }
            Self::Domain(DownloadDomainError::EmptyToken)
            | Self::User(_)
            | Self::EmptyTaskId
            | Self::Task(_)
            | Self::OwnerMismatch { .. }
            | Self::Expired(_) => ErrorKind::BadRequest,
            Self::TaskNotFound(_)
            | Self::NotFound(_)
            | Self::Repository(DownloadTokenRepositoryError::NotFound(_))
            | Self::TaskRepository(TaskRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::Repository(DownloadTokenRepositoryError::Persistence(_))
            | Self::TaskRepository(_) => ErrorKind::ServerError,
        }
    }
}

/// Result type for download token operations.
pub type DownloadTokenResult<T> = Result<T, DownloadTokenError>;

/// Issues and redeems download tokens for finished tasks.
pub struct DownloadTokenService<R, T, C>
where
    R: DownloadTokenRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tokens: Arc<R>,
    tasks: Arc<T>,
    clock: Arc<C>,
}

impl<R, T, C> Clone for DownloadTokenService<R, T, C>
where
    R: DownloadTokenRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, T, C> DownloadTokenService<R, T, C>
where
    R: DownloadTokenRepository + ?Sized,
    T: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new download token service.
    #[must_use]
    pub const fn new(tokens: Arc<R>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            tokens,
            tasks,
            clock,
        }
    }

    /// Issues a token for a finished task.
    ///
    /// A non-positive `ttl_seconds` selects the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::BadRequest`] error for blank ids, unfinished
    /// tasks and tasks owned by someone else, and
    /// [`DownloadTokenError::TaskNotFound`] when the task is absent.
    #[tracing::instrument(skip(self), fields(task_id = task_id.trim()))]
    pub async fn create_token(
        &self,
        task_id: &str,
        user_id: &str,
        ttl_seconds: i64,
    ) -> DownloadTokenResult<DownloadToken> {
        if task_id.trim().is_empty() {
            return Err(DownloadTokenError::EmptyTaskId);
        }
        let holder = UserId::new(user_id)?;
        let parsed = TaskId::parse(task_id)
            .map_err(|_| DownloadTokenError::TaskNotFound(task_id.trim().to_owned()))?;
        let task = self
            .tasks
            .find_by_id(parsed)
            .await?
            .ok_or_else(|| DownloadTokenError::TaskNotFound(task_id.trim().to_owned()))?;
        task.ensure_done()?;
        if task.owner().is_some_and(|owner| owner != &holder) {
            return Err(DownloadTokenError::OwnerMismatch {
                task_id: parsed,
                user_id: holder,
            });
        }

        let token = DownloadToken::issue(parsed, holder, ttl_seconds, &*self.clock);
        self.tokens.store(&token).await?;
        info!(expires_at = %token.expires_at(), "download token issued");
        Ok(token)
    }

    /// Redeems a token exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadTokenError::NotFound`] for unknown tokens, a
    /// [`ErrorKind::Conflict`] error for tokens that already left `active`,
    /// and [`DownloadTokenError::Expired`] after the deadline. The expired
    /// status is persisted before the error is returned.
    #[tracing::instrument(skip(self, token))]
    pub async fn use_token(&self, token: &str) -> DownloadTokenResult<DownloadToken> {
        let mut record = self.load(token).await?;

        let redemption = record.redeem(&*self.clock)?;
        self.tokens.update(&record).await?;
        match redemption {
            Redemption::Granted => {
                info!(task_id = %record.task_id(), "download token redeemed");
                Ok(record)
            }
            Redemption::Expired => {
                warn!(task_id = %record.task_id(), "download token redeemed after expiry");
                Err(DownloadTokenError::Expired(record.token().clone()))
            }
        }
    }

    /// Withdraws an active token.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadTokenError::NotFound`] for unknown tokens and a
    /// [`ErrorKind::Conflict`] error for tokens that already left `active`.
    #[tracing::instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> DownloadTokenResult<DownloadToken> {
        let mut record = self.load(token).await?;
        record.revoke()?;
        self.tokens.update(&record).await?;
        info!(task_id = %record.task_id(), "download token revoked");
        Ok(record)
    }

    async fn load(&self, token: &str) -> DownloadTokenResult<DownloadToken> {
        let value = TokenValue::parse(token)?;
        let found = self.tokens.find_by_token(&value).await?;
        found.ok_or(DownloadTokenError::NotFound(value))
    }
}
