//! Domain model for download tokens.

mod error;
mod token;

pub use error::{DownloadDomainError, ParseTokenStatusError};
pub use token::{
    DEFAULT_TTL_SECONDS, DownloadToken, PersistedTokenData, Redemption, TokenStatus, TokenValue,
};
