//! ID-photo task pipeline.
//!
//! A task turns one uploaded photograph into a background-removed baseline,
//! one or more colored variants and optional print layout sheets. The
//! pipeline talks to an external photo processor through a port and folds
//! every step failure into the persisted task status.
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
