//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: Uuid,
    /// Owning user identifier.
    pub owner_id: Option<String>,
    /// Specification code.
    pub spec_code: String,
    /// Output width.
    pub width_px: i64,
    /// Output height.
    pub height_px: i64,
    /// Output resolution.
    pub dpi: i64,
    /// Uploaded source reference.
    pub source_ref: String,
    /// Processing status.
    pub status: String,
    /// Failure reason.
    pub error_msg: Option<String>,
    /// Baseline reference.
    pub baseline_url: Option<String>,
    /// Variant references as a JSON object.
    pub processed_urls: serde_json::Value,
    /// Layout references as a JSON object.
    pub layout_urls: serde_json::Value,
    /// Available colors as a JSON array.
    pub available_colors: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: Uuid,
    /// Owning user identifier.
    pub owner_id: Option<String>,
    /// Specification code.
    pub spec_code: String,
    /// Output width.
    pub width_px: i64,
    /// Output height.
    pub height_px: i64,
    /// Output resolution.
    pub dpi: i64,
    /// Uploaded source reference.
    pub source_ref: String,
    /// Processing status.
    pub status: String,
    /// Failure reason.
    pub error_msg: Option<String>,
    /// Baseline reference.
    pub baseline_url: Option<String>,
    /// Variant references as a JSON object.
    pub processed_urls: serde_json::Value,
    /// Layout references as a JSON object.
    pub layout_urls: serde_json::Value,
    /// Available colors as a JSON array.
    pub available_colors: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
