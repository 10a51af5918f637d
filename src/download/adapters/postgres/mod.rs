//! `PostgreSQL` adapters for download tokens.

mod models;
mod repository;
mod schema;

pub use repository::{DownloadTokenPgPool, PostgresDownloadTokenRepository};
