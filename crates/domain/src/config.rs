//! Calendar synchronization configuration
//!
//! Deployment-level settings: the three audience calendar identifiers, the
//! time zone event payloads are expressed in, and the fan-out concurrency
//! limit. Constructed once and passed into the synchronizer so tests can
//! substitute their own values.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_TIME_ZONE};
use crate::errors::{LecternError, Result};
use crate::types::calendar::Audience;

/// Settings for the calendar fan-out subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSyncConfig {
    /// Shared calendar that enrolled students see
    pub students_calendar_id: Option<String>,
    /// Shared calendar that teaching assistants see
    pub tas_calendar_id: Option<String>,
    /// Shared calendar that professors see
    pub professors_calendar_id: Option<String>,
    /// IANA time-zone identifier event payloads are expressed in
    pub time_zone: String,
    /// Maximum number of in-flight provider calls
    pub max_in_flight: usize,
}

impl Default for CalendarSyncConfig {
    fn default() -> Self {
        Self {
            students_calendar_id: None,
            tas_calendar_id: None,
            professors_calendar_id: None,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl CalendarSyncConfig {
    /// The configured calendar id for an audience, if any.
    pub fn calendar_for(&self, audience: Audience) -> Option<&str> {
        match audience {
            Audience::Students => self.students_calendar_id.as_deref(),
            Audience::Tas => self.tas_calendar_id.as_deref(),
            Audience::Professors => self.professors_calendar_id.as_deref(),
        }
    }

    /// Parse the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| LecternError::Config(format!("unknown time zone: {}", self.time_zone)))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.tz()?;

        if self.max_in_flight == 0 {
            return Err(LecternError::Config("max_in_flight must be greater than 0".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CalendarSyncConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_time_zone() {
        let config =
            CalendarSyncConfig { time_zone: "Mars/Olympus_Mons".into(), ..Default::default() };

        assert!(matches!(config.validate(), Err(LecternError::Config(_))));
    }

    #[test]
    fn rejects_zero_in_flight_limit() {
        let config = CalendarSyncConfig { max_in_flight: 0, ..Default::default() };

        assert!(matches!(config.validate(), Err(LecternError::Config(_))));
    }

    #[test]
    fn calendar_lookup_per_audience() {
        let config = CalendarSyncConfig {
            students_calendar_id: Some("students@group.calendar".into()),
            ..Default::default()
        };

        assert_eq!(config.calendar_for(Audience::Students), Some("students@group.calendar"));
        assert_eq!(config.calendar_for(Audience::Professors), None);
    }
}
