//! Port interfaces for calendar fan-out operations

use async_trait::async_trait;
use lectern_domain::{CalendarEventIds, Course, EventPage, EventPayload, RecipientKey, Result};

/// External calendar provider operations, addressed per calendar id
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Create an event and return the provider-assigned event id
    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> Result<String>;

    /// Replace an existing event's payload
    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<()>;

    /// Delete an event; an already-gone event counts as success
    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;

    /// Fetch one page of the calendar's event listing
    async fn list_events(&self, calendar_id: &str, page_token: Option<&str>) -> Result<EventPage>;
}

/// Course roster lookup
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// Load the course record backing a sync operation
    async fn fetch_course(&self, course_id: &str) -> Result<Course>;
}

/// Persisted event-id bookkeeping for one owning domain entity
///
/// Pure storage: which remote event ids exist for which (audience, user)
/// pair of an entity. No sync decisions are made here.
#[async_trait]
pub trait EventIdRegistry: Send + Sync {
    /// Record (or overwrite) the event id for one recipient
    async fn record(&self, entity_id: &str, key: &RecipientKey, event_id: &str) -> Result<()>;

    /// Look up the event id recorded for one recipient
    async fn get(&self, entity_id: &str, key: &RecipientKey) -> Result<Option<String>>;

    /// Load the full registry entry for an entity
    async fn load(&self, entity_id: &str) -> Result<CalendarEventIds>;

    /// Drop every registered id for an entity
    async fn clear(&self, entity_id: &str) -> Result<()>;
}
