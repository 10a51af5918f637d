//! Application services for download tokens.

mod tokens;

pub use tokens::{DownloadTokenError, DownloadTokenResult, DownloadTokenService};
