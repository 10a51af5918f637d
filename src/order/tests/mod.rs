//! Unit tests for the order module.

mod service_tests;
