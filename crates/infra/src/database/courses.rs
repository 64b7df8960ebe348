//! Course directory repository

use async_trait::async_trait;
use lectern_core::CourseDirectory;
use lectern_domain::{
    Course, CourseMember, Enrollment, EnrollmentStatus, LecternError, Result,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::warn;

use super::SqlitePool;
use crate::errors::InfraError;

/// SQLite-backed course roster lookup
pub struct SqliteCourseDirectory {
    pool: SqlitePool,
}

impl SqliteCourseDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseDirectory for SqliteCourseDirectory {
    async fn fetch_course(&self, course_id: &str) -> Result<Course> {
        let pool = self.pool.clone();
        let course_id = course_id.to_string();

        task::spawn_blocking(move || -> Result<Course> {
            let conn = pool.get().map_err(InfraError::from)?;
            query_course(&conn, &course_id)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_course(conn: &Connection, course_id: &str) -> Result<Course> {
    let header = conn
        .query_row(
            "SELECT id, code, professor_id, professor_email FROM courses WHERE id = ?1",
            params![course_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()
        .map_err(InfraError::from)?;

    let (id, code, professor_id, professor_email) = header
        .ok_or_else(|| LecternError::NotFound(format!("course not found: {course_id}")))?;

    Ok(Course {
        id,
        code,
        professor: CourseMember::new(professor_id, professor_email),
        assistants: query_assistants(conn, course_id)?,
        enrollments: query_enrollments(conn, course_id)?,
    })
}

fn query_assistants(conn: &Connection, course_id: &str) -> Result<Vec<CourseMember>> {
    let mut stmt = conn
        .prepare("SELECT user_id, calendar_email FROM course_staff WHERE course_id = ?1")
        .map_err(InfraError::from)?;

    let rows = stmt
        .query_map(params![course_id], |row| {
            Ok(CourseMember::new(row.get::<_, String>(0)?, row.get(1)?))
        })
        .map_err(InfraError::from)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| InfraError::from(e).into())
}

fn query_enrollments(conn: &Connection, course_id: &str) -> Result<Vec<Enrollment>> {
    let mut stmt = conn
        .prepare("SELECT user_id, calendar_email, status FROM enrollments WHERE course_id = ?1")
        .map_err(InfraError::from)?;

    let rows = stmt
        .query_map(params![course_id], map_enrollment_row)
        .map_err(InfraError::from)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(|e| InfraError::from(e).into())
}

fn map_enrollment_row(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    let user_id: String = row.get(0)?;
    let status_raw: String = row.get(2)?;
    let status = parse_status(&status_raw).unwrap_or_else(|| {
        // Unknown statuses never receive events.
        warn!(user_id, status = status_raw, "unknown enrollment status, treating as inactive");
        EnrollmentStatus::Inactive
    });

    Ok(Enrollment { member: CourseMember::new(user_id, row.get(1)?), status })
}

fn parse_status(value: &str) -> Option<EnrollmentStatus> {
    match value {
        "active" => Some(EnrollmentStatus::Active),
        "pending" => Some(EnrollmentStatus::Pending),
        "inactive" => Some(EnrollmentStatus::Inactive),
        "rejected" => Some(EnrollmentStatus::Rejected),
        _ => None,
    }
}

fn map_join_error(err: task::JoinError) -> LecternError {
    LecternError::Internal(format!("blocking task failed: {err}"))
}
