//! Event projection
//!
//! Pure functions turning a syncable entity into a provider-neutral event
//! payload. No I/O; the synchronizer decides where the payload goes.

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use lectern_domain::constants::TIME_OF_DAY_FORMAT;
use lectern_domain::{
    EventPayload, LectureOccurrence, LecternError, OfficeHourSlot, Result, SyncEntity,
};

/// Build the provider payload for an entity in the configured time zone.
///
/// Office-hour slots carry times of day only; when the end is not after the
/// start the window rolls into the next calendar day, so overnight slots
/// stay valid and zero-duration windows never reach the provider.
pub fn project(entity: &SyncEntity, tz: Tz) -> Result<EventPayload> {
    match entity {
        SyncEntity::Lecture(lecture) => project_lecture(lecture, tz),
        SyncEntity::OfficeHours(slot) => project_office_hours(slot, tz),
    }
}

fn project_lecture(lecture: &LectureOccurrence, tz: Tz) -> Result<EventPayload> {
    Ok(EventPayload {
        summary: format!("{} - {}", lecture.course_code, lecture.title),
        location: None,
        start: lecture.start.with_timezone(&tz).naive_local(),
        end: lecture.end.with_timezone(&tz).naive_local(),
        time_zone: tz.name().to_string(),
        recurrence: Vec::new(),
        attendee_email: None,
    })
}

fn project_office_hours(slot: &OfficeHourSlot, tz: Tz) -> Result<EventPayload> {
    let start_time = parse_time_of_day(&slot.start_time)?;
    let end_time = parse_time_of_day(&slot.end_time)?;

    let start_date = anchor_date(slot.weekday)?;
    // Rollover: an end at or before the start belongs to the next day.
    let end_date =
        if end_time <= start_time { start_date + Duration::days(1) } else { start_date };

    Ok(EventPayload {
        summary: format!("{}'s Office Hours", slot.owner_name),
        location: slot.location.clone(),
        start: start_date.and_time(start_time),
        end: end_date.and_time(end_time),
        time_zone: tz.name().to_string(),
        recurrence: vec![format!("RRULE:FREQ=WEEKLY;BYDAY={}", byday(slot.weekday))],
        attendee_email: None,
    })
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_OF_DAY_FORMAT)
        .map_err(|e| LecternError::InvalidTimeFormat(format!("'{value}': {e}")))
}

/// Date of the slot's weekday within the fixed reference week.
///
/// Recurring events need a concrete first occurrence; the week starting
/// Monday 2024-01-01 serves as that anchor for every slot.
fn anchor_date(weekday: Weekday) -> Result<NaiveDate> {
    let monday = NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| LecternError::Internal("reference week start out of range".into()))?;

    Ok(monday + Duration::days(i64::from(weekday.num_days_from_monday())))
}

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
