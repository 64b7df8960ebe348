//! # Lectern Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Database implementations (SQLite via r2d2 pool)
//! - HTTP client with retry support
//! - The Google Calendar provider adapter
//!
//! ## Architecture
//! - Implements traits defined in `lectern-core`
//! - Depends on `lectern-domain` and `lectern-core`
//! - Contains all "impure" code (I/O, network)

pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

pub use database::{open_pool, SqliteCourseDirectory, SqliteEventIdRegistry, SqlitePool};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::GoogleCalendarApi;
