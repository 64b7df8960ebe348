//! # Lectern Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The calendar fan-out services (projector, resolver, synchronizer,
//!   bulk clearer)
//! - Port/adapter interfaces (traits) for the provider, the course roster,
//!   and the event-id registry
//!
//! ## Architecture Principles
//! - Only depends on `lectern-common` and `lectern-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod calendar;

// Re-export specific items to avoid ambiguity
pub use calendar::clear::BulkClearer;
pub use calendar::ports::{CalendarApi, CourseDirectory, EventIdRegistry};
pub use calendar::projection::project;
pub use calendar::recipients::{recipients_of, RecipientResolver};
pub use calendar::sync::CalendarSyncService;
