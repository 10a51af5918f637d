//! Port contracts for download token persistence.

pub mod repository;

pub use repository::{
    DownloadTokenRepository, DownloadTokenRepositoryError, DownloadTokenRepositoryResult,
};
