//! # Lectern Domain
//!
//! Business domain types and models for Lectern's calendar synchronization.
//!
//! This crate contains:
//! - Domain data types (recipients, sync entities, event payloads, reports)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Lectern crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::CalendarSyncConfig;
pub use errors::{LecternError, Result};
pub use types::calendar::{
    Audience, CalendarEventIds, ClearReport, EventPage, EventPayload, ListedEvent, Recipient,
    RecipientKey, Role, SyncOutcome, SyncReport,
};
pub use types::course::{Course, CourseMember, Enrollment, EnrollmentStatus};
pub use types::entity::{LectureOccurrence, OfficeHourSlot, SyncEntity};
