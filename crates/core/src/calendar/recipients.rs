//! Recipient resolution
//!
//! Enumerates who should see a course's calendar events: the professor,
//! every teaching assistant, and every actively enrolled student.

use std::sync::Arc;

use lectern_domain::{Course, EnrollmentStatus, Recipient, Result, Role};
use tracing::{debug, instrument};

use super::ports::CourseDirectory;

/// Enumerate the sync recipients of a course record.
///
/// The professor is always included; assistants fan out with the TA role;
/// enrollments count only when their status is exactly `Active` (pending,
/// inactive, and rejected enrollments get no events). Order carries no
/// meaning, fan-out treats every recipient independently.
pub fn recipients_of(course: &Course) -> Vec<Recipient> {
    let mut recipients =
        Vec::with_capacity(1 + course.assistants.len() + course.enrollments.len());

    recipients.push(Recipient::new(
        course.professor.user_id.clone(),
        Role::Professor,
        course.professor.calendar_email.clone(),
    ));

    for assistant in &course.assistants {
        recipients.push(Recipient::new(
            assistant.user_id.clone(),
            Role::Ta,
            assistant.calendar_email.clone(),
        ));
    }

    for enrollment in &course.enrollments {
        if enrollment.status == EnrollmentStatus::Active {
            recipients.push(Recipient::new(
                enrollment.member.user_id.clone(),
                Role::Student,
                enrollment.member.calendar_email.clone(),
            ));
        }
    }

    recipients
}

/// Resolver service loading the roster through the course directory port
pub struct RecipientResolver {
    directory: Arc<dyn CourseDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn CourseDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the concrete recipients for a sync operation.
    ///
    /// Fails with `NotFound` when the course id does not resolve; that
    /// aborts the whole sync attempt before any fan-out begins.
    #[instrument(skip(self))]
    pub async fn resolve(&self, course_id: &str) -> Result<Vec<Recipient>> {
        let course = self.directory.fetch_course(course_id).await?;
        let recipients = recipients_of(&course);

        debug!(course_id, count = recipients.len(), "resolved sync recipients");

        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use lectern_domain::{CourseMember, Enrollment, LecternError};

    use super::*;

    fn member(user_id: &str) -> CourseMember {
        CourseMember::new(user_id, Some(format!("{user_id}@university.edu")))
    }

    fn enrollment(user_id: &str, status: EnrollmentStatus) -> Enrollment {
        Enrollment { member: member(user_id), status }
    }

    fn course() -> Course {
        Course {
            id: "course-1".into(),
            code: "CS101".into(),
            professor: member("prof-1"),
            assistants: vec![],
            enrollments: vec![
                enrollment("s1", EnrollmentStatus::Active),
                enrollment("s2", EnrollmentStatus::Active),
                enrollment("s3", EnrollmentStatus::Pending),
                enrollment("s4", EnrollmentStatus::Inactive),
            ],
        }
    }

    #[test]
    fn includes_professor_and_only_active_students() {
        let recipients = recipients_of(&course());

        assert_eq!(recipients.len(), 3);
        assert!(recipients.iter().any(|r| r.user_id == "prof-1" && r.role == Role::Professor));
        assert!(recipients.iter().any(|r| r.user_id == "s1" && r.role == Role::Student));
        assert!(recipients.iter().any(|r| r.user_id == "s2" && r.role == Role::Student));
        assert!(!recipients.iter().any(|r| r.user_id == "s3" || r.user_id == "s4"));
    }

    #[test]
    fn assistants_fan_out_with_ta_role() {
        let mut course = course();
        course.assistants = vec![member("ta-1"), member("ta-2")];
        course.enrollments.clear();

        let recipients = recipients_of(&course);

        assert_eq!(recipients.len(), 3);
        assert_eq!(recipients.iter().filter(|r| r.role == Role::Ta).count(), 2);
    }

    #[test]
    fn rejected_enrollments_are_excluded() {
        let mut course = course();
        course.enrollments.push(enrollment("s5", EnrollmentStatus::Rejected));

        let recipients = recipients_of(&course);

        assert!(!recipients.iter().any(|r| r.user_id == "s5"));
    }

    struct FakeDirectory {
        course: Option<Course>,
    }

    #[async_trait]
    impl CourseDirectory for FakeDirectory {
        async fn fetch_course(&self, course_id: &str) -> Result<Course> {
            self.course
                .clone()
                .ok_or_else(|| LecternError::NotFound(format!("course not found: {course_id}")))
        }
    }

    #[tokio::test]
    async fn resolver_loads_roster_through_port() {
        let resolver = RecipientResolver::new(Arc::new(FakeDirectory { course: Some(course()) }));

        let recipients = resolver.resolve("course-1").await.unwrap();

        assert_eq!(recipients.len(), 3);
    }

    #[tokio::test]
    async fn missing_course_aborts_resolution() {
        let resolver = RecipientResolver::new(Arc::new(FakeDirectory { course: None }));

        let result = resolver.resolve("nope").await;

        assert!(matches!(result, Err(LecternError::NotFound(_))));
    }
}
