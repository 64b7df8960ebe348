//! Syncable domain entities
//!
//! The two entity kinds that project onto calendars. Both carry everything
//! the projector needs, so projection stays a pure function.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A single scheduled lecture occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureOccurrence {
    pub id: String,
    pub course_id: String,
    pub course_code: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A weekly recurring office-hour slot
///
/// Times of day are `"HH:MM"` strings as entered by the owner; parsing (and
/// its `InvalidTimeFormat` failure mode) happens at projection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeHourSlot {
    pub id: String,
    pub course_id: String,
    pub owner_id: String,
    pub owner_name: String,
    pub weekday: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
}

/// Union of everything the calendar subsystem can project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SyncEntity {
    Lecture(LectureOccurrence),
    OfficeHours(OfficeHourSlot),
}

impl SyncEntity {
    /// Identifier of the owning domain record (registry key).
    pub fn id(&self) -> &str {
        match self {
            Self::Lecture(lecture) => &lecture.id,
            Self::OfficeHours(slot) => &slot.id,
        }
    }

    pub fn course_id(&self) -> &str {
        match self {
            Self::Lecture(lecture) => &lecture.course_id,
            Self::OfficeHours(slot) => &slot.course_id,
        }
    }
}
