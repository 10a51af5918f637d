//! Adapter implementations for task ports.

pub mod filesystem;
pub mod http;
pub mod memory;
pub mod postgres;
