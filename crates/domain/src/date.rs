use chrono::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DayTimeError {
    #[error("Invalid calendar date: `{0}`")]
    InvalidDate(String),
    #[error("Invalid time of day: `{0}`")]
    InvalidTime(String),
}

/// A calendar date without any timezone attached. Always formatted
/// zero-padded as `YYYY-MM-DD` so that formatted values sort
/// lexicographically in the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Day {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DayTimeError> {
        if !(1970..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Err(DayTimeError::InvalidDate(format!(
                "{}-{}-{}",
                year, month, day
            )));
        }
        if day < 1 || day > month_length(year, month) {
            return Err(DayTimeError::InvalidDate(format!(
                "{}-{}-{}",
                year, month, day
            )));
        }
        Ok(Self { year, month, day })
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn to_naive(&self) -> NaiveDate {
        NaiveDate::from_ymd(self.year, self.month, self.day)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Day {
    type Err = DayTimeError;

    fn from_str(datestr: &str) -> Result<Self, Self::Err> {
        let dates = datestr.split('-').collect::<Vec<_>>();
        if dates.len() != 3 {
            return Err(DayTimeError::InvalidDate(datestr.into()));
        }
        let year = dates[0].parse();
        let month = dates[1].parse();
        let day = dates[2].parse();
        match (year, month, day) {
            (Ok(year), Ok(month), Ok(day)) => Self::new(year, month, day),
            _ => Err(DayTimeError::InvalidDate(datestr.into())),
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => panic!("Invalid month"),
    }
}

/// A wall-clock minute, formatted zero-padded as `HH:MM` (24h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Result<Self, DayTimeError> {
        if hours > 23 || minutes > 59 {
            return Err(DayTimeError::InvalidTime(format!(
                "{}:{}",
                hours, minutes
            )));
        }
        Ok(Self { hours, minutes })
    }

    pub fn from_minutes_since_midnight(minutes: u32) -> Result<Self, DayTimeError> {
        Self::new(minutes / 60, minutes % 60)
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl FromStr for TimeOfDay {
    type Err = DayTimeError;

    fn from_str(timestr: &str) -> Result<Self, Self::Err> {
        let parts = timestr.split(':').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(DayTimeError::InvalidTime(timestr.into()));
        }
        match (parts[0].parse(), parts[1].parse()) {
            (Ok(hours), Ok(minutes)) => Self::new(hours, minutes),
            _ => Err(DayTimeError::InvalidTime(timestr.into())),
        }
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}
