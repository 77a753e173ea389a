//! Wall-clock time of day with minute precision.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::common::constants::{HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR};

/// Errors produced while parsing an `HH:MM` string.
///
/// Both kinds are recoverable: configuration loading falls back to the
/// documented defaults instead of propagating them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// Not exactly one `:` separator, or a field that is not an integer.
    #[error("invalid time format '{input}' (expected HH:MM)")]
    InvalidFormat { input: String },

    /// Hours outside 0-23 or minutes outside 0-59.
    #[error("time '{input}' out of range: hours must be 0-23 and minutes 0-59 (got {hours}:{minutes})")]
    OutOfRange {
        input: String,
        hours: u32,
        minutes: u32,
    },
}

/// A point within a single day, stored as minutes since local midnight.
///
/// The value is always in `[0, 1440)`; the only ways to build one are
/// [`parse_time_of_day`] and the checked constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Compile-time constructor for constants. Panics on out-of-range input,
    /// which in a `const` item is a build error.
    pub const fn const_hm(hours: u32, minutes: u32) -> Self {
        assert!(hours < HOURS_PER_DAY && minutes < MINUTES_PER_HOUR);
        TimeOfDay(hours * MINUTES_PER_HOUR + minutes)
    }

    /// Build from hours and minutes, rejecting out-of-range fields.
    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        (hours < HOURS_PER_DAY && minutes < MINUTES_PER_HOUR)
            .then(|| TimeOfDay(hours * MINUTES_PER_HOUR + minutes))
    }

    /// Build from a minute count, rejecting values of a full day or more.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(TimeOfDay(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / MINUTES_PER_HOUR
    }

    pub fn minute(self) -> u32 {
        self.0 % MINUTES_PER_HOUR
    }
}

/// Parse an `HH:MM` string into a [`TimeOfDay`].
///
/// Surrounding whitespace is ignored. Single-digit fields (`7:5`) are accepted
/// since they are unambiguous.
pub fn parse_time_of_day(text: &str) -> Result<TimeOfDay, TimeParseError> {
    let trimmed = text.trim();
    let invalid = || TimeParseError::InvalidFormat {
        input: text.to_string(),
    };

    let mut fields = trimmed.split(':');
    let (Some(hours), Some(minutes), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(invalid());
    };

    let hours: u32 = parse_field(hours).ok_or_else(invalid)?;
    let minutes: u32 = parse_field(minutes).ok_or_else(invalid)?;

    TimeOfDay::from_hm(hours, minutes).ok_or_else(|| TimeParseError::OutOfRange {
        input: text.to_string(),
        hours,
        minutes,
    })
}

// Digits only: `u32::from_str` would also take a leading '+'.
fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_time_of_day(&text).map_err(serde::de::Error::custom)
    }
}
