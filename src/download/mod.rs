//! Single-use, time-limited download tokens for finished tasks.
//!
//! A token is issued for a `done` task and leaves the `active` status exactly
//! once: redeemed, expired on a late redemption, or revoked.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
