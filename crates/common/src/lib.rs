//! Generic utilities shared across Lectern crates.
//!
//! Nothing in this crate knows about courses, calendars, or any other
//! Lectern domain concept. Modules here are reusable building blocks the
//! domain-facing crates compose.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

// Re-export commonly used types for convenience
pub use resilience::{Bulkhead, BulkheadConfig, BulkheadMetrics, ConfigError};
