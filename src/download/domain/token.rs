//! Download token aggregate.

use super::{DownloadDomainError, ParseTokenStatusError};
use crate::task::domain::TaskId;
use crate::user::domain::UserId;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifetime applied when callers pass a non-positive TTL.
pub const DEFAULT_TTL_SECONDS: i64 = 600;

/// Opaque token value handed to the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenValue(String);

impl TokenValue {
    /// Generates a fresh random value of 32 hex characters.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps caller input.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadDomainError::EmptyToken`] when the value is blank.
    pub fn parse(value: &str) -> Result<Self, DownloadDomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DownloadDomainError::EmptyToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the value as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TokenValue {
    type Error = DownloadDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TokenValue> for String {
    fn from(token: TokenValue) -> Self {
        token.0
    }
}

/// Token lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Redeemable.
    Active,
    /// Redeemed once.
    Used,
    /// Redemption came after the deadline.
    Expired,
    /// Withdrawn before use.
    Revoked,
}

impl TokenStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

impl TryFrom<&str> for TokenStatus {
    type Error = ParseTokenStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "used" => Ok(Self::Used),
            "expired" => Ok(Self::Expired),
            "revoked" => Ok(Self::Revoked),
            _ => Err(ParseTokenStatusError(value.to_owned())),
        }
    }
}

/// Outcome of redeeming an active token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The token was consumed.
    Granted,
    /// The deadline had passed; the token is now expired.
    Expired,
}

/// Single-use download capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadToken {
    token: TokenValue,
    task_id: TaskId,
    user_id: UserId,
    status: TokenStatus,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTokenData {
    /// Persisted token value.
    pub token: TokenValue,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted holder.
    pub user_id: UserId,
    /// Persisted status.
    pub status: TokenStatus,
    /// Persisted deadline.
    pub expires_at: DateTime<Utc>,
    /// Persisted issue time.
    pub created_at: DateTime<Utc>,
    /// Persisted redemption time.
    pub used_at: Option<DateTime<Utc>>,
}

impl DownloadToken {
    /// Issues an active token valid for `ttl_seconds`.
    ///
    /// Non-positive lifetimes fall back to [`DEFAULT_TTL_SECONDS`].
    #[must_use]
    pub fn issue(task_id: TaskId, user_id: UserId, ttl_seconds: i64, clock: &impl Clock) -> Self {
        let lifetime = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            DEFAULT_TTL_SECONDS
        };
        let now = clock.utc();
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            token: TokenValue::generate(),
            task_id,
            user_id,
            status: TokenStatus::Active,
            expires_at,
            created_at: now,
            used_at: None,
        }
    }

    /// Reconstructs a token from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTokenData) -> Self {
        Self {
            token: data.token,
            task_id: data.task_id,
            user_id: data.user_id,
            status: data.status,
            expires_at: data.expires_at,
            created_at: data.created_at,
            used_at: data.used_at,
        }
    }

    /// Returns the token value.
    #[must_use]
    pub const fn token(&self) -> &TokenValue {
        &self.token
    }

    /// Returns the task the token unlocks.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the holder.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TokenStatus {
        self.status
    }

    /// Returns the redemption deadline.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the issue time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the token left `active` through redemption.
    #[must_use]
    pub const fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// Consumes the token.
    ///
    /// A redemption after the deadline moves the token to `expired` and
    /// reports [`Redemption::Expired`]; the caller must still persist it.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadDomainError::NotActive`] unless the token is active.
    pub fn redeem(&mut self, clock: &impl Clock) -> Result<Redemption, DownloadDomainError> {
        self.ensure_active()?;
        let now = clock.utc();
        self.used_at = Some(now);
        if now > self.expires_at {
            self.status = TokenStatus::Expired;
            return Ok(Redemption::Expired);
        }
        self.status = TokenStatus::Used;
        Ok(Redemption::Granted)
    }

    /// Withdraws an unused token.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadDomainError::NotActive`] unless the token is active.
    pub fn revoke(&mut self) -> Result<(), DownloadDomainError> {
        self.ensure_active()?;
        self.status = TokenStatus::Revoked;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), DownloadDomainError> {
        if self.status == TokenStatus::Active {
            return Ok(());
        }
        Err(DownloadDomainError::NotActive {
            token: self.token.clone(),
            status: self.status,
        })
    }
}
