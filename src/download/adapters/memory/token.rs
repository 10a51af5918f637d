//! In-memory repository for download tokens.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, RwLock};

use crate::download::{
    domain::{DownloadToken, TokenValue},
    ports::{
        DownloadTokenRepository, DownloadTokenRepositoryError, DownloadTokenRepositoryResult,
    },
};

/// Thread-safe in-memory download token repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDownloadTokenRepository {
    state: Arc<RwLock<HashMap<TokenValue, DownloadToken>>>,
}

impl InMemoryDownloadTokenRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: &impl Display) -> DownloadTokenRepositoryError {
    DownloadTokenRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DownloadTokenRepository for InMemoryDownloadTokenRepository {
    async fn store(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()> {
        let mut tokens = self.state.write().map_err(|err| lock_error(&err))?;
        if tokens.contains_key(token.token()) {
            return Err(DownloadTokenRepositoryError::DuplicateToken(
                token.token().clone(),
            ));
        }
        tokens.insert(token.token().clone(), token.clone());
        Ok(())
    }

    async fn update(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()> {
        let mut tokens = self.state.write().map_err(|err| lock_error(&err))?;
        let Some(existing) = tokens.get_mut(token.token()) else {
            return Err(DownloadTokenRepositoryError::NotFound(token.token().clone()));
        };
        *existing = token.clone();
        Ok(())
    }

    async fn find_by_token(
        &self,
        token: &TokenValue,
    ) -> DownloadTokenRepositoryResult<Option<DownloadToken>> {
        let tokens = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(tokens.get(token).cloned())
    }
}
