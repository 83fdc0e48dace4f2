use crate::date::{Day, DayTimeError, TimeOfDay};
use crate::settings::ReminderSettings;
use chrono::prelude::*;
use chrono_tz::Tz;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One UTC minute, rendered as `YYYY-MM-DDTHH:MM`. Used as the entries of
/// `utcTimes` / `sentUtc` and as the minute-bucket key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcSlot {
    pub date: Day,
    pub time: TimeOfDay,
}

impl UtcSlot {
    pub fn new(date: Day, time: TimeOfDay) -> Self {
        Self { date, time }
    }

    /// The minute the given instant falls in, seconds truncated.
    pub fn from_datetime(instant: &DateTime<Utc>) -> Self {
        Self {
            date: Day::from_date(instant),
            time: TimeOfDay {
                hours: instant.hour(),
                minutes: instant.minute(),
            },
        }
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_utc(
            self.date
                .to_naive()
                .and_hms(self.time.hours, self.time.minutes, 0),
            Utc,
        )
    }
}

impl fmt::Display for UtcSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

impl FromStr for UtcSlot {
    type Err = DayTimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value.split('T').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(DayTimeError::InvalidDate(value.into()));
        }
        Ok(Self {
            date: parts[0].parse()?,
            time: parts[1].parse()?,
        })
    }
}

impl Serialize for UtcSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtcSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// The persisted per-user reminder plan for one local calendar day.
///
/// `times`, `utc_times` and `reminders_per_day` always have matching
/// lengths, `sent_utc` only ever contains entries of `utc_times`. The
/// record is valid for the single local date it was generated for; once
/// the user's local date advances it is stale and must be rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub user_id: String,
    pub date: Day,
    pub timezone: Tz,
    pub reminders_per_day: u32,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub times: Vec<TimeOfDay>,
    pub utc_times: Vec<UtcSlot>,
    pub sent_utc: Vec<UtcSlot>,
}

impl ScheduleRecord {
    pub fn new(
        user_id: String,
        date: Day,
        settings: &ReminderSettings,
        times: Vec<TimeOfDay>,
        utc_times: Vec<UtcSlot>,
    ) -> Self {
        Self {
            user_id,
            date,
            timezone: settings.timezone,
            reminders_per_day: settings.reminders_per_day,
            start_time: settings.start_time,
            end_time: settings.end_time,
            times,
            utc_times,
            sent_utc: Vec::new(),
        }
    }

    pub fn contains_slot(&self, slot: &UtcSlot) -> bool {
        self.utc_times.contains(slot)
    }

    pub fn is_sent(&self, slot: &UtcSlot) -> bool {
        self.sent_utc.contains(slot)
    }

    pub fn mark_sent(&mut self, slot: UtcSlot) {
        if !self.sent_utc.contains(&slot) {
            self.sent_utc.push(slot);
        }
    }

    pub fn is_for_local_date(&self, today: Day) -> bool {
        self.date == today
    }

    /// The effective settings this record was generated from. `None` when
    /// the persisted values can no longer form a valid settings entity, in
    /// which case the caller falls back to the stored settings.
    pub fn recover_settings(&self) -> Option<ReminderSettings> {
        ReminderSettings::new(
            true,
            self.reminders_per_day,
            self.start_time,
            self.end_time,
            self.timezone,
        )
        .ok()
    }
}

/// The retired on-disk shape keyed by `schedule:{date}:{userId}`. Every
/// field is optional since records of this generation were written by
/// several client versions. Decoded only by the refresh engine's one-time
/// migration path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyScheduleRecord {
    #[serde(default)]
    pub timezone: Option<Tz>,
    #[serde(default)]
    pub reminders_per_day: Option<u32>,
    #[serde(default)]
    pub start_time: Option<TimeOfDay>,
    #[serde(default)]
    pub end_time: Option<TimeOfDay>,
    #[serde(default)]
    pub times: Vec<TimeOfDay>,
    #[serde(default)]
    pub utc_times: Vec<UtcSlot>,
    #[serde(default)]
    pub sent_utc: Vec<UtcSlot>,
}

impl LegacyScheduleRecord {
    pub fn recover_settings(&self) -> Option<ReminderSettings> {
        ReminderSettings::new(
            true,
            self.reminders_per_day?,
            self.start_time?,
            self.end_time?,
            self.timezone?,
        )
        .ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn slot(value: &str) -> UtcSlot {
        value.parse().unwrap()
    }

    fn record() -> ScheduleRecord {
        let settings = ReminderSettings::new(
            true,
            2,
            "09:00".parse().unwrap(),
            "21:00".parse().unwrap(),
            "America/New_York".parse().unwrap(),
        )
        .unwrap();
        ScheduleRecord::new(
            "user-1".into(),
            "2025-06-01".parse().unwrap(),
            &settings,
            vec!["09:30".parse().unwrap(), "14:30".parse().unwrap()],
            vec![slot("2025-06-01T13:30"), slot("2025-06-01T18:30")],
        )
    }

    #[test]
    fn it_parses_and_formats_utc_slots() {
        let s = slot("2025-06-01T18:30");
        assert_eq!(s.to_string(), "2025-06-01T18:30");
        assert_eq!(
            UtcSlot::from_datetime(&Utc.ymd(2025, 6, 1).and_hms(18, 30, 42)),
            s
        );
        assert!("2025-06-01 18:30".parse::<UtcSlot>().is_err());
        assert!("2025-06-01T25:30".parse::<UtcSlot>().is_err());
    }

    #[test]
    fn it_marks_slots_sent_once() {
        let mut record = record();
        let s = slot("2025-06-01T18:30");
        assert!(!record.is_sent(&s));

        record.mark_sent(s);
        record.mark_sent(s);
        assert!(record.is_sent(&s));
        assert_eq!(record.sent_utc.len(), 1);
    }

    #[test]
    fn it_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(&record()).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["remindersPerDay"], 2);
        assert_eq!(json["utcTimes"][1], "2025-06-01T18:30");
        assert_eq!(json["timezone"], "America/New_York");
    }

    #[test]
    fn it_recovers_settings_from_a_complete_record() {
        let settings = record().recover_settings().unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.reminders_per_day, 2);
    }

    #[test]
    fn it_rejects_settings_recovery_for_degenerate_records() {
        let mut record = record();
        record.reminders_per_day = 0;
        assert!(record.recover_settings().is_none());
    }

    #[test]
    fn it_decodes_legacy_records_with_missing_fields() {
        let legacy: LegacyScheduleRecord =
            serde_json::from_str(r#"{"times":["09:30"],"utcTimes":["2025-06-01T13:30"]}"#).unwrap();
        assert_eq!(legacy.utc_times, vec![slot("2025-06-01T13:30")]);
        assert!(legacy.recover_settings().is_none());

        let full: LegacyScheduleRecord = serde_json::from_str(
            r#"{
                "timezone": "America/New_York",
                "remindersPerDay": 1,
                "startTime": "09:00",
                "endTime": "21:00",
                "times": ["14:30"],
                "utcTimes": ["2025-06-01T18:30"]
            }"#,
        )
        .unwrap();
        assert!(full.recover_settings().is_some());
    }
}
