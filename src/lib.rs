//! Permit: ID-photo processing with order payments and download tokens.
//!
//! A user uploads a portrait; the task pipeline cuts out the subject, renders
//! it on a background color and, on demand, composes printable 6×4 inch
//! sheets. Orders pay for finished tasks and download tokens grant a single,
//! time-limited download.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, filesystem,
//!   HTTP, in-memory)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`task`]: ID-photo tasks and the processing pipeline
//! - [`order`]: Orders and payment intents
//! - [`download`]: Single-use download tokens
//! - [`user`]: User resolution by external identity
//! - [`app`]: Start-up wiring
//! - [`config`]: Environment configuration
//! - [`telemetry`]: Logging setup

pub mod app;
pub mod config;
pub mod download;
pub mod error;
pub mod order;
pub mod task;
pub mod telemetry;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod user;
