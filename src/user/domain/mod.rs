//! Domain model for users.

mod error;
mod ids;
mod user;

pub use error::UserDomainError;
pub use ids::{MAX_OPEN_ID_CHARS, MAX_USER_ID_CHARS, OpenId, UserId};
pub use user::{PersistedUserData, User};
