//! Adapter implementations for download token ports.

pub mod memory;
pub mod postgres;
