//! Diesel row models for download token persistence.

use super::schema::download_tokens;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for download tokens.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = download_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DownloadTokenRow {
    /// Token value.
    pub token: String,
    /// Task reference.
    pub task_id: Uuid,
    /// Holder.
    pub user_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Deadline.
    pub expires_at: DateTime<Utc>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Redemption timestamp.
    pub used_at: Option<DateTime<Utc>>,
}

/// Insert model for download tokens.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = download_tokens)]
pub struct NewDownloadTokenRow {
    /// Token value.
    pub token: String,
    /// Task reference.
    pub task_id: Uuid,
    /// Holder.
    pub user_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Deadline.
    pub expires_at: DateTime<Utc>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
    /// Redemption timestamp.
    pub used_at: Option<DateTime<Utc>>,
}
