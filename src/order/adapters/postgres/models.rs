//! Diesel row models for order persistence.

use super::schema::orders;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for order records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    /// Internal order identifier.
    pub id: Uuid,
    /// Referenced task.
    pub task_id: Uuid,
    /// Line items.
    pub items: serde_json::Value,
    /// Delivery city.
    pub city: String,
    /// Remark.
    pub remark: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Payment channel.
    pub channel: String,
    /// Payment status.
    pub status: String,
    /// Recorded idempotency key.
    pub payment_key: Option<String>,
    /// Cached payment intent.
    pub payment_intent: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for order records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub struct NewOrderRow {
    /// Internal order identifier.
    pub id: Uuid,
    /// Referenced task.
    pub task_id: Uuid,
    /// Line items.
    pub items: serde_json::Value,
    /// Delivery city.
    pub city: String,
    /// Remark.
    pub remark: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Payment channel.
    pub channel: String,
    /// Payment status.
    pub status: String,
    /// Recorded idempotency key.
    pub payment_key: Option<String>,
    /// Cached payment intent.
    pub payment_intent: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
