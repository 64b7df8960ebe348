//! Resilience patterns for fault tolerance
//!
//! Currently carries the bulkhead (bounded-concurrency executor). The
//! implementations are generic: no domain types, no domain error mapping.

pub mod bulkhead;

pub use bulkhead::{Bulkhead, BulkheadConfig, BulkheadMetrics, ConfigError};
