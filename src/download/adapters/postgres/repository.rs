//! `PostgreSQL` repository implementation for download tokens.

use super::{
    models::{DownloadTokenRow, NewDownloadTokenRow},
    schema::download_tokens,
};
use crate::download::{
    domain::{DownloadToken, PersistedTokenData, TokenStatus, TokenValue},
    ports::{
        DownloadTokenRepository, DownloadTokenRepositoryError, DownloadTokenRepositoryResult,
    },
};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by download token adapters.
pub type DownloadTokenPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed download token repository.
#[derive(Debug, Clone)]
pub struct PostgresDownloadTokenRepository {
    pool: DownloadTokenPgPool,
}

impl PostgresDownloadTokenRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DownloadTokenPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> DownloadTokenRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DownloadTokenRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(DownloadTokenRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(DownloadTokenRepositoryError::persistence)?
    }
}

#[async_trait]
impl DownloadTokenRepository for PostgresDownloadTokenRepository {
    async fn store(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()> {
        let value = token.token().clone();
        let new_row = to_new_row(token);

        self.run_blocking(move |connection| {
            diesel::insert_into(download_tokens::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DownloadTokenRepositoryError::DuplicateToken(value)
                    }
                    _ => DownloadTokenRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, token: &DownloadToken) -> DownloadTokenRepositoryResult<()> {
        let value = token.token().clone();
        let row = to_new_row(token);

        self.run_blocking(move |connection| {
            let updated_count = diesel::update(
                download_tokens::table.filter(download_tokens::token.eq(value.as_str())),
            )
            .set((
                download_tokens::status.eq(&row.status),
                download_tokens::used_at.eq(row.used_at),
            ))
            .execute(connection)
            .map_err(DownloadTokenRepositoryError::persistence)?;
            if updated_count == 0 {
                return Err(DownloadTokenRepositoryError::NotFound(value));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_token(
        &self,
        token: &TokenValue,
    ) -> DownloadTokenRepositoryResult<Option<DownloadToken>> {
        let value = token.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = download_tokens::table
                .filter(download_tokens::token.eq(value))
                .select(DownloadTokenRow::as_select())
                .first::<DownloadTokenRow>(connection)
                .optional()
                .map_err(DownloadTokenRepositoryError::persistence)?;
            row.map(row_to_token).transpose()
        })
        .await
    }
}

fn to_new_row(token: &DownloadToken) -> NewDownloadTokenRow {
    NewDownloadTokenRow {
        token: token.token().as_str().to_owned(),
        task_id: token.task_id().into_inner(),
        user_id: token.user_id().as_str().to_owned(),
        status: token.status().as_str().to_owned(),
        expires_at: token.expires_at(),
        created_at: token.created_at(),
        used_at: token.used_at(),
    }
}

fn row_to_token(row: DownloadTokenRow) -> DownloadTokenRepositoryResult<DownloadToken> {
    let DownloadTokenRow {
        token,
        task_id,
        user_id,
        status,
        expires_at,
        created_at,
        used_at,
    } = row;

    Ok(DownloadToken::from_persisted(PersistedTokenData {
        token: TokenValue::parse(&token).map_err(DownloadTokenRepositoryError::persistence)?,
        task_id: TaskId::from_uuid(task_id),
        user_id: UserId::new(user_id).map_err(DownloadTokenRepositoryError::persistence)?,
        status: TokenStatus::try_from(status.as_str())
            .map_err(DownloadTokenRepositoryError::persistence)?,
        expires_at,
        created_at,
        used_at,
    }))
}
