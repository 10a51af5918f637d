//! Identifier types for the order domain.

use super::OrderDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random order identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an order identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses an order identifier from caller input.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDomainError::InvalidOrderId`] when the value is not a
    /// UUID.
    pub fn parse(value: &str) -> Result<Self, OrderDomainError> {
        Uuid::try_parse(value.trim())
            .map(Self)
            .map_err(|_| OrderDomainError::InvalidOrderId(value.to_owned()))
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Longest accepted idempotency key, in characters.
pub const MAX_IDEMPOTENCY_KEY_CHARS: usize = 128;

/// Caller-supplied key identifying one logical payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Creates a validated idempotency key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderDomainError::EmptyIdempotencyKey`] when the value is
    /// blank and [`OrderDomainError::IdempotencyKeyTooLong`] when it exceeds
    /// [`MAX_IDEMPOTENCY_KEY_CHARS`].
    pub fn new(value: &str) -> Result<Self, OrderDomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(OrderDomainError::EmptyIdempotencyKey);
        }
        let length = trimmed.chars().count();
        if length > MAX_IDEMPOTENCY_KEY_CHARS {
            return Err(OrderDomainError::IdempotencyKeyTooLong(length));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = OrderDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<IdempotencyKey> for String {
    fn from(key: IdempotencyKey) -> Self {
        key.0
    }
}
