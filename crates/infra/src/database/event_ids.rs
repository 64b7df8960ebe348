//! Event-id registry repository
//!
//! One row per (entity, audience, user): the provider event id created for
//! that recipient. Recording the same recipient twice overwrites the row,
//! matching the synchronizer's retry semantics.

use async_trait::async_trait;
use lectern_core::EventIdRegistry;
use lectern_domain::{Audience, CalendarEventIds, LecternError, RecipientKey, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::SqlitePool;
use crate::errors::InfraError;

/// SQLite-backed event-id registry
pub struct SqliteEventIdRegistry {
    pool: SqlitePool,
}

impl SqliteEventIdRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventIdRegistry for SqliteEventIdRegistry {
    async fn record(&self, entity_id: &str, key: &RecipientKey, event_id: &str) -> Result<()> {
        let pool = self.pool.clone();
        let entity_id = entity_id.to_string();
        let key = key.clone();
        let event_id = event_id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get().map_err(InfraError::from)?;
            conn.execute(
                "INSERT OR REPLACE INTO calendar_event_ids (entity_id, audience, user_id, event_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entity_id, key.audience.as_str(), key.user_id, event_id],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, entity_id: &str, key: &RecipientKey) -> Result<Option<String>> {
        let pool = self.pool.clone();
        let entity_id = entity_id.to_string();
        let key = key.clone();

        task::spawn_blocking(move || -> Result<Option<String>> {
            let conn = pool.get().map_err(InfraError::from)?;
            conn.query_row(
                "SELECT event_id FROM calendar_event_ids
                 WHERE entity_id = ?1 AND audience = ?2 AND user_id = ?3",
                params![entity_id, key.audience.as_str(), key.user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| InfraError::from(e).into())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn load(&self, entity_id: &str) -> Result<CalendarEventIds> {
        let pool = self.pool.clone();
        let entity_id = entity_id.to_string();

        task::spawn_blocking(move || -> Result<CalendarEventIds> {
            let conn = pool.get().map_err(InfraError::from)?;
            load_ids(&conn, &entity_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear(&self, entity_id: &str) -> Result<()> {
        let pool = self.pool.clone();
        let entity_id = entity_id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get().map_err(InfraError::from)?;
            conn.execute(
                "DELETE FROM calendar_event_ids WHERE entity_id = ?1",
                params![entity_id],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn load_ids(conn: &Connection, entity_id: &str) -> Result<CalendarEventIds> {
    let mut stmt = conn
        .prepare(
            "SELECT audience, user_id, event_id FROM calendar_event_ids WHERE entity_id = ?1",
        )
        .map_err(InfraError::from)?;

    let rows = stmt
        .query_map(params![entity_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(InfraError::from)?;

    let mut ids = CalendarEventIds::default();
    for row in rows {
        let (audience_raw, user_id, event_id) = row.map_err(InfraError::from)?;
        let audience = parse_audience(&audience_raw)?;
        ids.insert(&RecipientKey::new(audience, user_id), event_id);
    }

    Ok(ids)
}

fn parse_audience(value: &str) -> Result<Audience> {
    Audience::ALL
        .into_iter()
        .find(|audience| audience.as_str() == value)
        .ok_or_else(|| LecternError::Database(format!("unknown audience bucket: {value}")))
}

fn map_join_error(err: task::JoinError) -> LecternError {
    LecternError::Internal(format!("blocking task failed: {err}"))
}
