//! Closed error taxonomy shared by every service in the crate.
//!
//! Service error types stay specific to their bounded context, but each one
//! reports an [`ErrorKind`] so a transport layer can map failures to status
//! codes without matching on individual variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The input is malformed or violates a policy.
    BadRequest,
    /// The request collides with the current state of the entity.
    Conflict,
    /// Storage or transport failed for reasons outside the caller's input.
    ServerError,
}

impl ErrorKind {
    /// Returns the canonical name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Conflict => "conflict",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest prefix of untrusted text embedded in an error message.
pub const DIAGNOSTIC_PREFIX_CHARS: usize = 32;

/// Returns at most [`DIAGNOSTIC_PREFIX_CHARS`] characters of `text`.
#[must_use]
pub fn diagnostic_prefix(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_PREFIX_CHARS).collect()
}
