//! Application services for user resolution.

mod directory;

pub use directory::{UserDirectoryError, UserDirectoryResult, UserDirectoryService};
