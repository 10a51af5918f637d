//! Adapter implementations for user ports.

pub mod memory;
pub mod postgres;
