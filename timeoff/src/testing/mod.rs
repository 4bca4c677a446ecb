//! Testing utilities for code built on the time-off core.
//!
//! - [`generators`]: `proptest` strategies for requests and histories
//!
//! Enabled by the `testing` feature.

pub mod generators;
