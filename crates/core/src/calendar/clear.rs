//! Bulk calendar clearing
//!
//! Pages through a calendar's full event listing and deletes every listed
//! event under the same bounded-concurrency discipline as the fan-out
//! synchronizer. Used for test-environment resets and decommissioning a
//! shared calendar.

use std::sync::Arc;

use futures::future::join_all;
use lectern_common::{Bulkhead, BulkheadConfig};
use lectern_domain::constants::MAX_LIST_PAGES;
use lectern_domain::{ClearReport, LecternError, ListedEvent, Result};
use tracing::{info, instrument, warn};

use super::ports::CalendarApi;

/// Deletes every event on a calendar, page by page
pub struct BulkClearer {
    api: Arc<dyn CalendarApi>,
    bulkhead: Bulkhead,
}

impl BulkClearer {
    pub fn new(api: Arc<dyn CalendarApi>, max_in_flight: usize) -> Result<Self> {
        let bulkhead = Bulkhead::new(BulkheadConfig::new(max_in_flight))
            .map_err(|e| LecternError::Config(e.to_string()))?;

        Ok(Self { api, bulkhead })
    }

    /// Clear the calendar and report what happened.
    ///
    /// Listing and deleting are two phases: the listing collects event ids
    /// across pages first, then every collected id is deleted with bounded
    /// concurrency. A listing failure stops the collection but the events
    /// already collected are still deleted; the report's `listing_complete`
    /// flag tells the caller the pass may have missed events.
    #[instrument(skip(self))]
    pub async fn clear_calendar(&self, calendar_id: &str) -> Result<ClearReport> {
        let (events, pages, listing_complete) = self.collect_events(calendar_id).await;

        let tasks = events.iter().map(|event| async move {
            match self.bulkhead.run(|| self.api.delete_event(calendar_id, &event.id)).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "bulk delete failed");
                    false
                }
            }
        });

        let results = join_all(tasks).await;
        let failed = results.iter().filter(|deleted| !**deleted).count();

        let report = ClearReport {
            attempted: events.len(),
            deleted: events.len() - failed,
            failed,
            pages,
            listing_complete,
        };
        info!(
            calendar_id,
            attempted = report.attempted,
            deleted = report.deleted,
            failed = report.failed,
            listing_complete = report.listing_complete,
            "bulk clear finished"
        );

        Ok(report)
    }

    async fn collect_events(&self, calendar_id: &str) -> (Vec<ListedEvent>, usize, bool) {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            if pages >= MAX_LIST_PAGES {
                warn!(calendar_id, pages, "listing stopped at page limit");
                return (events, pages, false);
            }

            match self.api.list_events(calendar_id, page_token.as_deref()).await {
                Ok(page) => {
                    pages += 1;
                    events.extend(page.items);
                    match page.next_page_token {
                        Some(token) => page_token = Some(token),
                        None => return (events, pages, true),
                    }
                }
                Err(e) => {
                    warn!(calendar_id, pages, error = %e, "listing aborted, clearing partial set");
                    return (events, pages, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use lectern_domain::{EventPage, EventPayload};

    use super::*;

    /// Scripted listing pages plus per-event delete failures.
    struct PagedApi {
        pages: Vec<Result<EventPage>>,
        fail_delete: HashSet<String>,
        deleted: Mutex<Vec<String>>,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl PagedApi {
        fn new(pages: Vec<Result<EventPage>>) -> Self {
            Self {
                pages,
                fail_delete: HashSet::new(),
                deleted: Mutex::new(Vec::new()),
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn failing_delete(mut self, event_ids: &[&str]) -> Self {
            self.fail_delete = event_ids.iter().map(|id| (*id).to_string()).collect();
            self
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> EventPage {
        EventPage {
            items: ids
                .iter()
                .map(|id| ListedEvent { id: (*id).to_string(), summary: None })
                .collect(),
            next_page_token: next.map(String::from),
        }
    }

    #[async_trait]
    impl CalendarApi for PagedApi {
        async fn create_event(&self, _calendar_id: &str, _payload: &EventPayload) -> Result<String> {
            unimplemented!("not used in clearing tests")
        }

        async fn update_event(
            &self,
            _calendar_id: &str,
            _event_id: &str,
            _payload: &EventPayload,
        ) -> Result<()> {
            unimplemented!("not used in clearing tests")
        }

        async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<()> {
            let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            if self.fail_delete.contains(event_id) {
                return Err(LecternError::Network("permission denied".into()));
            }
            self.deleted.lock().unwrap().push(event_id.to_string());
            Ok(())
        }

        async fn list_events(
            &self,
            _calendar_id: &str,
            page_token: Option<&str>,
        ) -> Result<EventPage> {
            let index = page_token.map_or(0, |token| token.parse::<usize>().unwrap());
            match &self.pages[index] {
                Ok(page) => Ok(page.clone()),
                Err(e) => Err(LecternError::Network(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn clears_every_event_across_pages() {
        let api = Arc::new(PagedApi::new(vec![
            Ok(page(&["a", "b"], Some("1"))),
            Ok(page(&["c", "d"], Some("2"))),
            Ok(page(&["e"], None)),
        ]));
        let clearer = BulkClearer::new(Arc::clone(&api) as Arc<dyn CalendarApi>, 4).unwrap();

        let report = clearer.clear_calendar("students-cal").await.unwrap();

        assert_eq!(report.attempted, 5);
        assert_eq!(report.deleted, 5);
        assert_eq!(report.failed, 0);
        assert_eq!(report.pages, 3);
        assert!(report.listing_complete);
        assert_eq!(api.deleted.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn failed_deletes_are_counted_not_raised() {
        let api = Arc::new(
            PagedApi::new(vec![Ok(page(&["a", "b", "c", "d"], None))])
                .failing_delete(&["b", "d"]),
        );
        let clearer = BulkClearer::new(api, 4).unwrap();

        let report = clearer.clear_calendar("students-cal").await.unwrap();

        assert_eq!(report.attempted, 4);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn listing_failure_still_clears_collected_events() {
        let api = Arc::new(PagedApi::new(vec![
            Ok(page(&["a", "b"], Some("1"))),
            Err(LecternError::Network("listing unavailable".into())),
        ]));
        let clearer = BulkClearer::new(Arc::clone(&api) as Arc<dyn CalendarApi>, 4).unwrap();

        let report = clearer.clear_calendar("students-cal").await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.deleted, 2);
        assert_eq!(report.pages, 1);
        assert!(!report.listing_complete, "aborted listing must be flagged");
    }

    #[tokio::test]
    async fn empty_calendar_yields_empty_report() {
        let api = Arc::new(PagedApi::new(vec![Ok(page(&[], None))]));
        let clearer = BulkClearer::new(api, 4).unwrap();

        let report = clearer.clear_calendar("students-cal").await.unwrap();

        assert_eq!(report.attempted, 0);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.pages, 1);
        assert!(report.listing_complete);
    }

    #[tokio::test]
    async fn deletes_respect_the_concurrency_limit() {
        let ids: Vec<String> = (0..20).map(|i| format!("ev-{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let api = Arc::new(PagedApi::new(vec![Ok(page(&refs, None))]));
        let clearer = BulkClearer::new(Arc::clone(&api) as Arc<dyn CalendarApi>, 3).unwrap();

        let report = clearer.clear_calendar("students-cal").await.unwrap();

        assert_eq!(report.deleted, 20);
        let peak = api.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight {peak} exceeded limit 3");
    }
}
