//! Adapter implementations for order ports.

pub mod memory;
pub mod payment;
pub mod postgres;
