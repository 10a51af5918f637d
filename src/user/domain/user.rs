//! User aggregate.

use super::{OpenId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// A user known to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    open_id: OpenId,
    nickname: String,
    avatar_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted external open id.
    pub open_id: OpenId,
    /// Persisted display name.
    pub nickname: String,
    /// Persisted avatar URL.
    pub avatar_url: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Registers a new user for an external open id.
    #[must_use]
    pub fn register(open_id: OpenId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: UserId::generate(),
            open_id,
            nickname: String::new(),
            avatar_url: String::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            open_id: data.open_id,
            nickname: data.nickname,
            avatar_url: data.avatar_url,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the external open id.
    #[must_use]
    pub const fn open_id(&self) -> &OpenId {
        &self.open_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Returns the avatar URL.
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
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

    /// Replaces the profile fields shown to other users.
    pub fn update_profile(
        &mut self,
        nickname: impl Into<String>,
        avatar_url: impl Into<String>,
        clock: &impl Clock,
    ) {
        self.nickname = nickname.into().trim().to_owned();
        self.avatar_url = avatar_url.into().trim().to_owned();
        self.updated_at = clock.utc();
    }
}
