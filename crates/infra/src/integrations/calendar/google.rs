//! Google Calendar provider implementation
//!
//! Implements the [`CalendarApi`] port against the Calendar v3 REST API.
//! Deleting an event that is already gone (404 or 410) counts as success,
//! so delete passes are safe to re-run.

use async_trait::async_trait;
use lectern_core::CalendarApi;
use lectern_domain::{EventPage, EventPayload, LecternError, ListedEvent, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::InfraError;
use crate::http::HttpClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Datetime format the Calendar API expects alongside a named time zone.
const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Google Calendar provider
pub struct GoogleCalendarApi {
    http: HttpClient,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarApi {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_token, GOOGLE_CALENDAR_API_BASE)
    }

    /// Point the adapter at a different API base, used by tests to target a
    /// mock server.
    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = HttpClient::builder().user_agent("lectern-calendar-sync").build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, calendar_id)
    }

    async fn error_from(response: reqwest::Response) -> LecternError {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
        LecternError::Network(format!("calendar API error ({status}): {body}"))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarApi {
    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> Result<String> {
        let request = self
            .http
            .request(Method::POST, self.events_url(calendar_id))
            .bearer_auth(&self.access_token)
            .json(&WireEvent::from_payload(payload));

        let response = self.http.send(request).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let created: WireCreatedEvent = response.json().await.map_err(InfraError::from)?;
        debug!(calendar_id, event_id = %created.id, "event created");

        Ok(created.id)
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<()> {
        let url = format!("{}/{}", self.events_url(calendar_id), event_id);
        let request = self
            .http
            .request(Method::PUT, url)
            .bearer_auth(&self.access_token)
            .json(&WireEvent::from_payload(payload));

        let response = self.http.send(request).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.events_url(calendar_id), event_id);
        let request =
            self.http.request(Method::DELETE, url).bearer_auth(&self.access_token);

        let response = self.http.send(request).await?;
        let status = response.status();

        // An event deleted out of band leaves nothing to do.
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(calendar_id, event_id, "event already gone");
            return Ok(());
        }
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    async fn list_events(&self, calendar_id: &str, page_token: Option<&str>) -> Result<EventPage> {
        let mut request = self
            .http
            .request(Method::GET, self.events_url(calendar_id))
            .bearer_auth(&self.access_token);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = self.http.send(request).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let listing: WireEventListing = response.json().await.map_err(InfraError::from)?;

        Ok(EventPage {
            items: listing
                .items
                .into_iter()
                .map(|item| ListedEvent { id: item.id, summary: item.summary })
                .collect(),
            next_page_token: listing.next_page_token,
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Wire format */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
struct WireEvent {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    start: WireEventTime,
    end: WireEventTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    recurrence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<Vec<WireAttendee>>,
}

#[derive(Debug, Serialize)]
struct WireEventTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct WireAttendee {
    email: String,
}

impl WireEvent {
    fn from_payload(payload: &EventPayload) -> Self {
        Self {
            summary: payload.summary.clone(),
            location: payload.location.clone(),
            start: WireEventTime {
                date_time: payload.start.format(WIRE_DATETIME_FORMAT).to_string(),
                time_zone: payload.time_zone.clone(),
            },
            end: WireEventTime {
                date_time: payload.end.format(WIRE_DATETIME_FORMAT).to_string(),
                time_zone: payload.time_zone.clone(),
            },
            recurrence: payload.recurrence.clone(),
            attendees: payload
                .attendee_email
                .as_ref()
                .map(|email| vec![WireAttendee { email: email.clone() }]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCreatedEvent {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireEventListing {
    #[serde(default)]
    items: Vec<WireListedEvent>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireListedEvent {
    id: String,
    summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn payload() -> EventPayload {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(15, 0, 0).unwrap();
        EventPayload {
            summary: "Dr. Reyes's Office Hours".into(),
            location: Some("Room 5".into()),
            start,
            end: start + chrono::Duration::hours(1),
            time_zone: "America/New_York".into(),
            recurrence: vec!["RRULE:FREQ=WEEKLY;BYDAY=MO".into()],
            attendee_email: Some("s1@university.edu".into()),
        }
    }

    async fn api(server: &MockServer) -> GoogleCalendarApi {
        GoogleCalendarApi::with_base_url("test-token", server.uri()).unwrap()
    }

    #[tokio::test]
    async fn create_posts_wire_event_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/students-cal/events"))
            .and(body_partial_json(json!({
                "summary": "Dr. Reyes's Office Hours",
                "start": {"dateTime": "2024-01-01T15:00:00", "timeZone": "America/New_York"},
                "recurrence": ["RRULE:FREQ=WEEKLY;BYDAY=MO"],
                "attendees": [{"email": "s1@university.edu"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ev-123"})))
            .expect(1)
            .mount(&server)
            .await;

        let event_id =
            api(&server).await.create_event("students-cal", &payload()).await.unwrap();

        assert_eq!(event_id, "ev-123");
    }

    #[tokio::test]
    async fn create_failure_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = api(&server).await.create_event("students-cal", &payload()).await;

        match result {
            Err(LecternError::Network(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("forbidden"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_puts_to_the_event_resource() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/calendars/students-cal/events/ev-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ev-123"})))
            .expect(1)
            .mount(&server)
            .await;

        api(&server)
            .await
            .update_event("students-cal", "ev-123", &payload())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_treats_missing_event_as_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/calendars/students-cal/events/ev-gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        api(&server).await.delete_event("students-cal", "ev-gone").await.unwrap();
    }

    #[tokio::test]
    async fn list_follows_the_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/students-cal/events"))
            .and(query_param("pageToken", "next-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "ev-1", "summary": "CS101 - Intro"}, {"id": "ev-2"}],
                "nextPageToken": "next-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page =
            api(&server).await.list_events("students-cal", Some("next-1")).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, "ev-1");
        assert_eq!(page.items[0].summary.as_deref(), Some("CS101 - Intro"));
        assert_eq!(page.next_page_token.as_deref(), Some("next-2"));
    }

    #[tokio::test]
    async fn list_without_items_yields_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let page = api(&server).await.list_events("students-cal", None).await.unwrap();

        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
