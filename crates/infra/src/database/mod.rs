//! SQLite-backed repositories
//!
//! A shared r2d2 connection pool plus the repositories implementing the
//! core storage ports. Queries run on the blocking thread pool so the
//! async runtime is never stalled by SQLite.

use std::path::Path;

use lectern_domain::Result;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::errors::InfraError;

pub mod courses;
pub mod event_ids;

pub use courses::SqliteCourseDirectory;
pub use event_ids::SqliteEventIdRegistry;

pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS courses (
        id              TEXT PRIMARY KEY,
        code            TEXT NOT NULL,
        professor_id    TEXT NOT NULL,
        professor_email TEXT
    );

    CREATE TABLE IF NOT EXISTS course_staff (
        course_id      TEXT NOT NULL,
        user_id        TEXT NOT NULL,
        calendar_email TEXT,
        PRIMARY KEY (course_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS enrollments (
        course_id      TEXT NOT NULL,
        user_id        TEXT NOT NULL,
        calendar_email TEXT,
        status         TEXT NOT NULL,
        PRIMARY KEY (course_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS calendar_event_ids (
        entity_id TEXT NOT NULL,
        audience  TEXT NOT NULL,
        user_id   TEXT NOT NULL,
        event_id  TEXT NOT NULL,
        PRIMARY KEY (entity_id, audience, user_id)
    );
";

/// Open (or create) the database, apply the schema, and build the pool.
pub fn open_pool(path: &Path, max_size: u32) -> Result<SqlitePool> {
    let manager = SqliteConnectionManager::file(path);
    let pool = r2d2::Pool::builder().max_size(max_size).build(manager).map_err(InfraError::from)?;

    let conn = pool.get().map_err(InfraError::from)?;
    conn.execute_batch(SCHEMA).map_err(InfraError::from)?;
    info!(path = %path.display(), "database ready");

    Ok(pool)
}

#[cfg(test)]
pub(crate) fn test_pool() -> (SqlitePool, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("temp dir created");
    let pool = open_pool(&dir.path().join("lectern.db"), 4).expect("pool opened");
    (pool, dir)
}
