use crate::date::TimeOfDay;
use crate::reminder_times::InvalidWindow;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_REMINDERS_PER_DAY: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error(transparent)]
    Window(#[from] InvalidWindow),
    #[error("remindersPerDay must be between 1 and {}, got {0}", MAX_REMINDERS_PER_DAY)]
    InvalidRemindersPerDay(u32),
}

/// The user-owned reminder settings, overwritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub enabled: bool,
    pub reminders_per_day: u32,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub timezone: Tz,
}

impl ReminderSettings {
    pub fn new(
        enabled: bool,
        reminders_per_day: u32,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        timezone: Tz,
    ) -> Result<Self, SettingsError> {
        if reminders_per_day < 1 || reminders_per_day > MAX_REMINDERS_PER_DAY {
            return Err(SettingsError::InvalidRemindersPerDay(reminders_per_day));
        }
        if start_time >= end_time {
            return Err(InvalidWindow {
                start: start_time,
                end: end_time,
            }
            .into());
        }
        Ok(Self {
            enabled,
            reminders_per_day,
            start_time,
            end_time,
            timezone,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn time(timestr: &str) -> TimeOfDay {
        timestr.parse().unwrap()
    }

    fn tz() -> Tz {
        "Europe/Oslo".parse().unwrap()
    }

    #[test]
    fn it_accepts_valid_settings() {
        for count in 1..=MAX_REMINDERS_PER_DAY {
            assert!(ReminderSettings::new(true, count, time("08:00"), time("22:00"), tz()).is_ok());
        }
    }

    #[test]
    fn it_rejects_out_of_range_reminder_counts() {
        for count in &[0, 11, 100] {
            let res = ReminderSettings::new(true, *count, time("08:00"), time("22:00"), tz());
            assert_eq!(res.unwrap_err(), SettingsError::InvalidRemindersPerDay(*count));
        }
    }

    #[test]
    fn it_rejects_an_inverted_or_empty_window() {
        assert!(ReminderSettings::new(true, 3, time("22:00"), time("08:00"), tz()).is_err());
        assert!(ReminderSettings::new(true, 3, time("08:00"), time("08:00"), tz()).is_err());
    }

    #[test]
    fn it_round_trips_through_serde() {
        let settings =
            ReminderSettings::new(true, 3, time("08:00"), time("22:00"), tz()).unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"remindersPerDay\":3"));
        assert_eq!(
            serde_json::from_str::<ReminderSettings>(&json).unwrap(),
            settings
        );
    }
}
