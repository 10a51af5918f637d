//! Error types for download token validation.

use super::{TokenStatus, TokenValue};
use thiserror::Error;

/// Errors returned while issuing or consuming download tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadDomainError {
    /// The token value is blank.
    #[error("download token must not be empty")]
    EmptyToken,

    /// The token already left the `active` status.
    #[error("download token {token} is {}", status.as_str())]
    NotActive {
        /// Affected token.
        token: TokenValue,
        /// Current status.
        status: TokenStatus,
    },
}

/// Error returned while parsing token statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown download token status: {0}")]
pub struct ParseTokenStatusError(pub String);
