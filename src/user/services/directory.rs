//! Service resolving external identities to persisted users.

use crate::error::ErrorKind;
use crate::user::{
    domain::{OpenId, User, UserDomainError, UserId},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for user operations.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// The requested user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

impl UserDirectoryError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::BadRequest,
            Self::NotFound(_) | Self::Repository(UserRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(
                UserRepositoryError::DuplicateUser(_) | UserRepositoryError::DuplicateOpenId(_),
            ) => ErrorKind::Conflict,
            Self::Repository(UserRepositoryError::Persistence(_)) => ErrorKind::ServerError,
        }
    }
}

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Resolves and maintains user records.
pub struct UserDirectoryService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for UserDirectoryService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> UserDirectoryService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new user directory service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the user registered for `open_id`, registering one when absent.
    ///
    /// Concurrent first logins for the same open id converge on one record:
    /// the loser of the insert race reloads the winner's row.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Domain`] for a blank open id and
    /// [`UserDirectoryError::Repository`] when persistence fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_or_register(&self, raw_open_id: &str) -> UserDirectoryResult<User> {
        let open_id = OpenId::new(raw_open_id)?;
        if let Some(existing) = self.repository.find_by_open_id(&open_id).await? {
            debug!(user_id = %existing.id(), "resolved existing user");
            return Ok(existing);
        }

        let user = User::register(open_id.clone(), &*self.clock);
        match self.repository.store(&user).await {
            Ok(()) => {
                info!(user_id = %user.id(), "registered user");
                Ok(user)
            }
            Err(UserRepositoryError::DuplicateOpenId(_)) => self
                .repository
                .find_by_open_id(&open_id)
                .await?
                .ok_or_else(|| UserDirectoryError::NotFound(user.id().clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Loads a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when no user matches.
    pub async fn find(&self, user_id: &UserId) -> UserDirectoryResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserDirectoryError::NotFound(user_id.clone()))
    }

    /// Replaces a user's display profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when no user matches.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        nickname: &str,
        avatar_url: &str,
    ) -> UserDirectoryResult<User> {
        let mut user = self.find(user_id).await?;
        user.update_profile(nickname, avatar_url, &*self.clock);
        self.repository.update(&user).await?;
        Ok(user)
    }
}
