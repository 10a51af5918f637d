//! User records for task ownership.
//!
//! Users are identified by an internal [`domain::UserId`] and by the open id
//! issued by the external identity provider. Credential issuance lives
//! outside this crate; this module only resolves an open id to a persisted
//! user, registering it on first sight.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
