//! Identifier types for the user domain.

use super::UserDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest accepted user identifier, in characters.
pub const MAX_USER_ID_CHARS: usize = 64;

/// Longest accepted open id, in characters.
pub const MAX_OPEN_ID_CHARS: usize = 128;

/// Identifier of a user who owns tasks and download tokens.
///
/// Identifiers issued by this crate are 32 lowercase hex characters, but the
/// type accepts any non-blank value of at most [`MAX_USER_ID_CHARS`]
/// characters so ids minted by an upstream identity layer can flow through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyUserId`] when the value is blank and
    /// [`UserDomainError::UserIdTooLong`] when it exceeds
    /// [`MAX_USER_ID_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyUserId);
        }
        let length = trimmed.chars().count();
        if length > MAX_USER_ID_CHARS {
            return Err(UserDomainError::UserIdTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = UserDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Identifier assigned to the user by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpenId(String);

impl OpenId {
    /// Creates a validated open id.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyOpenId`] when the value is blank and
    /// [`UserDomainError::OpenIdTooLong`] when it exceeds
    /// [`MAX_OPEN_ID_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyOpenId);
        }
        let length = trimmed.chars().count();
        if length > MAX_OPEN_ID_CHARS {
            return Err(UserDomainError::OpenIdTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the open id as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OpenId {
    type Error = UserDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OpenId> for String {
    fn from(open_id: OpenId) -> Self {
        open_id.0
    }
}
