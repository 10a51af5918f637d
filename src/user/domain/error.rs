//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing user domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user identifier is empty after trimming.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The external open id is empty after trimming.
    #[error("open id must not be empty")]
    EmptyOpenId,

    /// The user identifier is longer than the stored column allows.
    #[error("user id has {0} characters, at most 64 are accepted")]
    UserIdTooLong(usize),

    /// The open id is longer than the stored column allows.
    #[error("open id has {0} characters, at most 128 are accepted")]
    OpenIdTooLong(usize),
}
