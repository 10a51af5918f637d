//! Repository port for download token persistence.

use crate::download::domain::{DownloadToken, TokenValue};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for download token repository operations.
pub type DownloadTokenRepositoryResult<T> = Result<T, DownloadTokenRepositoryError>;

/// Download token persistence contract.
#[async_trait]
pub trait DownloadTokenRepository: Send + Sync {
    /// Stores a newly issued token.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadTokenRepositoryError::DuplicateToken`] when the value
    /// already exists.
    async fn store(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()>;

    /// Persists a status change.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadTokenRepositoryError::NotFound`] when the token does
    /// not exist.
    async fn update(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()>;

    /// Finds a token by value.
    async fn find_by_token(
        &self,
        token: &TokenValue,
    ) -> DownloadTokenRepositoryResult<Option<DownloadToken>>;
}

/// Errors returned by download token repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DownloadTokenRepositoryError {
    /// A token with the same value already exists.
    #[error("duplicate download token: {0}")]
    DuplicateToken(TokenValue),

    /// The token was not found.
    #[error("download token not found: {0}")]
    NotFound(TokenValue),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DownloadTokenRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
