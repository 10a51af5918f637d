//! Unit tests for the download module.
