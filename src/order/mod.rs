//! Orders and payment initiation for finished ID-photo tasks.
//!
//! An order references one task and moves through `created → pending` when a
//! payment intent is issued, then to whatever status the payment callback
//! reports. Intent issuance is idempotent per caller-supplied key.
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
