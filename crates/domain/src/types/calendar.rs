//! Calendar fan-out data types
//!
//! Recipients, projected event payloads, per-recipient sync outcomes, and
//! the persisted event-id registry sub-document.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Role of one calendar recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Ta,
    Professor,
}

impl Role {
    /// The audience calendar this role projects onto.
    pub fn audience(self) -> Audience {
        match self {
            Self::Student => Audience::Students,
            Self::Ta => Audience::Tas,
            Self::Professor => Audience::Professors,
        }
    }
}

/// One of the three audience calendars configured per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Students,
    Tas,
    Professors,
}

impl Audience {
    pub const ALL: [Self; 3] = [Self::Students, Self::Tas, Self::Professors];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Tas => "tas",
            Self::Professors => "professors",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one fan-out result: audience bucket plus user id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientKey {
    pub audience: Audience,
    pub user_id: String,
}

impl RecipientKey {
    pub fn new(audience: Audience, user_id: impl Into<String>) -> Self {
        Self { audience, user_id: user_id.into() }
    }
}

impl fmt::Display for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.audience, self.user_id)
    }
}

/// One user who should see a projected event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub user_id: String,
    pub role: Role,
    /// Personal calendar address attached to shared-calendar events as an
    /// attendee. A recipient without one still gets the shared event.
    pub calendar_email: Option<String>,
}

impl Recipient {
    pub fn new(user_id: impl Into<String>, role: Role, calendar_email: Option<String>) -> Self {
        Self { user_id: user_id.into(), role, calendar_email }
    }

    /// The result-map key for this recipient.
    pub fn key(&self) -> RecipientKey {
        RecipientKey::new(self.role.audience(), self.user_id.clone())
    }
}

/// Provider-neutral event payload produced by the projector
///
/// Start and end are naive local datetimes paired with an IANA zone name,
/// matching how the provider wire format expresses zoned events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    pub location: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    /// RRULE lines; empty for non-recurring events
    pub recurrence: Vec<String>,
    pub attendee_email: Option<String>,
}

impl EventPayload {
    /// Attach (or clear) the personal attendee for one recipient.
    pub fn with_attendee(mut self, email: Option<String>) -> Self {
        self.attendee_email = email;
        self
    }
}

/// Outcome of one (entity, recipient) sync call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncOutcome {
    Created { event_id: String },
    Updated { event_id: String },
    Deleted { event_id: String },
    Skipped { reason: String },
    Failed { reason: String },
}

impl SyncOutcome {
    /// Whether the provider call settled successfully (skips count: no call
    /// was owed).
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// The remote event id carried by event-creating outcomes.
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Created { event_id } | Self::Updated { event_id } => Some(event_id),
            _ => None,
        }
    }
}

/// Aggregated fan-out result: exactly one outcome per submitted recipient
pub type SyncReport = HashMap<RecipientKey, SyncOutcome>;

/// Persisted event-id registry sub-document owned by one domain entity
///
/// Shaped `{students: {userId: eventId}, tas: {...}, professors: {...}}` so
/// it can be embedded verbatim in the owning record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventIds {
    pub students: HashMap<String, String>,
    pub tas: HashMap<String, String>,
    pub professors: HashMap<String, String>,
}

impl CalendarEventIds {
    pub fn bucket(&self, audience: Audience) -> &HashMap<String, String> {
        match audience {
            Audience::Students => &self.students,
            Audience::Tas => &self.tas,
            Audience::Professors => &self.professors,
        }
    }

    pub fn bucket_mut(&mut self, audience: Audience) -> &mut HashMap<String, String> {
        match audience {
            Audience::Students => &mut self.students,
            Audience::Tas => &mut self.tas,
            Audience::Professors => &mut self.professors,
        }
    }

    pub fn insert(&mut self, key: &RecipientKey, event_id: impl Into<String>) {
        self.bucket_mut(key.audience).insert(key.user_id.clone(), event_id.into());
    }

    pub fn get(&self, key: &RecipientKey) -> Option<&str> {
        self.bucket(key.audience).get(&key.user_id).map(String::as_str)
    }

    pub fn contains(&self, key: &RecipientKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.students.len() + self.tas.len() + self.professors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered (key, event id) pair across all three buckets.
    pub fn entries(&self) -> Vec<(RecipientKey, String)> {
        Audience::ALL
            .into_iter()
            .flat_map(|audience| {
                self.bucket(audience)
                    .iter()
                    .map(move |(user_id, event_id)| {
                        (RecipientKey::new(audience, user_id.clone()), event_id.clone())
                    })
            })
            .collect()
    }

    /// Merge event-creating outcomes from a fan-out report.
    ///
    /// Skipped and failed outcomes never produce a registry entry.
    pub fn absorb(&mut self, report: &SyncReport) {
        for (key, outcome) in report {
            if let Some(event_id) = outcome.event_id() {
                self.insert(key, event_id);
            }
        }
    }
}

/// One provider-listed event (bulk clear input)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedEvent {
    pub id: String,
    pub summary: Option<String>,
}

/// One page of a provider event listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPage {
    pub items: Vec<ListedEvent>,
    pub next_page_token: Option<String>,
}

/// Result of a bulk clear pass over one calendar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    /// Events found by the listing and submitted for deletion
    pub attempted: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Listing pages consumed
    pub pages: usize,
    /// False when the listing stopped before the provider reported the end
    pub listing_complete: bool,
}
