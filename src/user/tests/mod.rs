//! Unit tests for the user bounded context.
