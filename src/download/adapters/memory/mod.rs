//! In-memory adapters for download tokens.

mod token;

pub use token::InMemoryDownloadTokenRepository;
