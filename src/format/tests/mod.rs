//! Unit tests for export format implementations.
//!
//! These tests pin down the exact wire shapes the exporters produce and the
//! lenient behavior of the JSON importer.

mod training_tests;
