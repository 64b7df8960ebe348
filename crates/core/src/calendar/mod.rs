//! Calendar fan-out subsystem
//!
//! Projects lecture occurrences and office-hour slots onto the three
//! audience calendars, one provider call per recipient, with bounded
//! concurrency and per-recipient outcome reporting.

pub mod clear;
pub mod ports;
pub mod projection;
pub mod recipients;
pub mod sync;

pub use clear::BulkClearer;
pub use ports::{CalendarApi, CourseDirectory, EventIdRegistry};
pub use recipients::RecipientResolver;
pub use sync::CalendarSyncService;
