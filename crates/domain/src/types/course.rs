//! Course roster types consumed by the recipient resolver

use serde::{Deserialize, Serialize};

/// Enrollment lifecycle status; only `Active` students receive events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Pending,
    Inactive,
    Rejected,
}

/// One course member (professor, assistant, or student)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMember {
    pub user_id: String,
    pub calendar_email: Option<String>,
}

impl CourseMember {
    pub fn new(user_id: impl Into<String>, calendar_email: Option<String>) -> Self {
        Self { user_id: user_id.into(), calendar_email }
    }
}

/// One student's enrollment in a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub member: CourseMember,
    pub status: EnrollmentStatus,
}

/// Course record as seen by the calendar subsystem
///
/// The surrounding application owns the full course document; this carries
/// only what recipient resolution needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub professor: CourseMember,
    pub assistants: Vec<CourseMember>,
    pub enrollments: Vec<Enrollment>,
}
