//! Unit tests for the task pipeline.

mod pipeline_tests;
mod support;
