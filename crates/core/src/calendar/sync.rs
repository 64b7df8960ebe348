//! Calendar fan-out synchronizer
//!
//! Issues one provider call per (entity, recipient) pair, bounded by the
//! configured in-flight limit, and aggregates a per-recipient outcome map.
//! A recipient's failure never cancels or blocks its siblings; the
//! aggregated report is produced only after every submitted call settled.

use std::sync::Arc;

use futures::future::join_all;
use lectern_common::{Bulkhead, BulkheadConfig};
use lectern_domain::{
    Audience, CalendarEventIds, CalendarSyncConfig, LecternError, Recipient, Result, SyncEntity,
    SyncOutcome, SyncReport,
};
use tracing::{info, instrument, warn};

use super::ports::{CalendarApi, EventIdRegistry};
use super::projection;

/// Fan-out synchronizer over the calendar provider port
pub struct CalendarSyncService {
    api: Arc<dyn CalendarApi>,
    registry: Arc<dyn EventIdRegistry>,
    config: CalendarSyncConfig,
    bulkhead: Bulkhead,
}

impl CalendarSyncService {
    /// Create a new synchronizer; validates the configuration up front.
    pub fn new(
        api: Arc<dyn CalendarApi>,
        registry: Arc<dyn EventIdRegistry>,
        config: CalendarSyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        let bulkhead = Bulkhead::new(BulkheadConfig::new(config.max_in_flight))
            .map_err(|e| LecternError::Config(e.to_string()))?;

        Ok(Self { api, registry, config, bulkhead })
    }

    /// Create one event per recipient on the recipient's audience calendar.
    ///
    /// Projection happens before any network call: an unprojectable entity
    /// aborts the whole attempt with no partial side effects. This method
    /// performs no dedup; callers consult the registry first (or use
    /// [`Self::create_missing`]).
    #[instrument(skip(self, recipients), fields(entity_id = entity.id()))]
    pub async fn sync_create(
        &self,
        entity: &SyncEntity,
        recipients: &[Recipient],
    ) -> Result<SyncReport> {
        let tz = self.config.tz()?;
        let base = projection::project(entity, tz)?;

        let tasks = recipients.iter().map(|recipient| {
            let key = recipient.key();
            let payload = base.clone().with_attendee(recipient.calendar_email.clone());
            async move {
                let outcome = match self.config.calendar_for(key.audience) {
                    None => skipped(key.audience),
                    Some(calendar_id) => {
                        match self.bulkhead.run(|| self.api.create_event(calendar_id, &payload)).await
                        {
                            Ok(event_id) => SyncOutcome::Created { event_id },
                            Err(e) => {
                                warn!(recipient = %key, error = %e, "event create failed");
                                SyncOutcome::Failed { reason: e.to_string() }
                            }
                        }
                    }
                };
                (key, outcome)
            }
        });

        let report: SyncReport = join_all(tasks).await.into_iter().collect();
        self.log_settled("create", entity.id(), &report);

        Ok(report)
    }

    /// Push the entity's current payload to every registered event.
    ///
    /// The attendee list is left untouched on the provider side; only the
    /// projected fields change.
    #[instrument(skip(self, ids), fields(entity_id = entity.id()))]
    pub async fn sync_update(
        &self,
        entity: &SyncEntity,
        ids: &CalendarEventIds,
    ) -> Result<SyncReport> {
        let tz = self.config.tz()?;
        let payload = projection::project(entity, tz)?;

        let tasks = ids.entries().into_iter().map(|(key, event_id)| {
            let payload = &payload;
            async move {
                let outcome = match self.config.calendar_for(key.audience) {
                    None => skipped(key.audience),
                    Some(calendar_id) => {
                        match self
                            .bulkhead
                            .run(|| self.api.update_event(calendar_id, &event_id, payload))
                            .await
                        {
                            Ok(()) => SyncOutcome::Updated { event_id },
                            Err(e) => {
                                warn!(recipient = %key, error = %e, "event update failed");
                                SyncOutcome::Failed { reason: e.to_string() }
                            }
                        }
                    }
                };
                (key, outcome)
            }
        });

        let report: SyncReport = join_all(tasks).await.into_iter().collect();
        self.log_settled("update", entity.id(), &report);

        Ok(report)
    }

    /// Attempt deletion for every event id in a registry entry.
    ///
    /// Every id is attempted independently; the registry itself is not
    /// touched here, callers decide what a partial result means (see
    /// [`Self::remove_entity`]).
    #[instrument(skip(self, ids))]
    pub async fn sync_delete(&self, entity_id: &str, ids: &CalendarEventIds) -> Result<SyncReport> {
        let tasks = ids.entries().into_iter().map(|(key, event_id)| async move {
            let outcome = match self.config.calendar_for(key.audience) {
                None => skipped(key.audience),
                Some(calendar_id) => {
                    match self.bulkhead.run(|| self.api.delete_event(calendar_id, &event_id)).await
                    {
                        Ok(()) => SyncOutcome::Deleted { event_id },
                        Err(e) => {
                            warn!(recipient = %key, error = %e, "event delete failed");
                            SyncOutcome::Failed { reason: e.to_string() }
                        }
                    }
                }
            };
            (key, outcome)
        });

        let report: SyncReport = join_all(tasks).await.into_iter().collect();
        self.log_settled("delete", entity_id, &report);

        Ok(report)
    }

    /// Registry-consulting create: fan out only for recipients that have no
    /// registered event yet, then record the ids of everything created.
    ///
    /// Re-running after a partial failure retries exactly the recipients
    /// that are still missing.
    #[instrument(skip(self, recipients), fields(entity_id = entity.id()))]
    pub async fn create_missing(
        &self,
        entity: &SyncEntity,
        recipients: &[Recipient],
    ) -> Result<SyncReport> {
        let existing = self.registry.load(entity.id()).await?;
        let pending: Vec<Recipient> =
            recipients.iter().filter(|r| !existing.contains(&r.key())).cloned().collect();

        if pending.len() < recipients.len() {
            info!(
                entity_id = entity.id(),
                already_synced = recipients.len() - pending.len(),
                "skipping recipients with registered events"
            );
        }

        let report = self.sync_create(entity, &pending).await?;

        for (key, outcome) in &report {
            if let Some(event_id) = outcome.event_id() {
                self.registry.record(entity.id(), key, event_id).await?;
            }
        }

        Ok(report)
    }

    /// Delete every registered event of an entity and clear its registry
    /// entry, but only when the full pass succeeded.
    ///
    /// Any failed or skipped deletion leaves the whole entry in place so a
    /// later pass still knows which remote events exist.
    #[instrument(skip(self))]
    pub async fn remove_entity(&self, entity_id: &str) -> Result<SyncReport> {
        let ids = self.registry.load(entity_id).await?;
        if ids.is_empty() {
            return Ok(SyncReport::new());
        }

        let report = self.sync_delete(entity_id, &ids).await?;

        let fully_deleted =
            report.values().all(|outcome| matches!(outcome, SyncOutcome::Deleted { .. }));

        if fully_deleted {
            self.registry.clear(entity_id).await?;
            info!(entity_id, deleted = report.len(), "registry entry cleared");
        } else {
            warn!(entity_id, "partial delete pass, registry entry kept");
        }

        Ok(report)
    }

    fn log_settled(&self, operation: &str, entity_id: &str, report: &SyncReport) {
        let failed = report
            .values()
            .filter(|outcome| matches!(outcome, SyncOutcome::Failed { .. }))
            .count();
        let skipped = report
            .values()
            .filter(|outcome| matches!(outcome, SyncOutcome::Skipped { .. }))
            .count();

        info!(operation, entity_id, total = report.len(), failed, skipped, "fan-out settled");
    }
}

fn skipped(audience: Audience) -> SyncOutcome {
    SyncOutcome::Skipped { reason: format!("no calendar configured for {audience}") }
}
