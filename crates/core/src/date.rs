use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in canonical `YYYY-MM-DD` form.
///
/// Only zero-padded four digit years are accepted, so the string order of
/// two dates is their chronological order and SQL range filters can compare
/// the stored text directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UsageDate(String);

impl UsageDate {
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let malformed = || RangeError::Malformed {
            value: value.to_string(),
        };
        let trimmed = value.trim();
        let parsed = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| malformed())?;
        if !(0..=9999).contains(&parsed.year()) {
            return Err(malformed());
        }
        let canonical = parsed.format(DATE_FORMAT).to_string();
        if canonical != trimmed {
            return Err(malformed());
        }
        Ok(Self(canonical))
    }

    pub fn from_naive(date: NaiveDate) -> Result<Self, RangeError> {
        Self::parse(&date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_naive(&self) -> NaiveDate {
        // Construction guarantees the canonical format.
        NaiveDate::parse_from_str(&self.0, DATE_FORMAT).unwrap_or_default()
    }

    pub fn succ(&self) -> Result<Self, RangeError> {
        Self::from_naive(self.to_naive() + Duration::days(1))
    }
}

impl fmt::Display for UsageDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UsageDate {
    type Error = RangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UsageDate::parse(&value)
    }
}

impl From<UsageDate> for String {
    fn from(value: UsageDate) -> String {
        value.0
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRange {
    start: UsageDate,
    end: UsageDate,
}

impl DayRange {
    pub fn new(start: UsageDate, end: UsageDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted {
                start: start.0,
                end: end.0,
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        Self::new(UsageDate::parse(start)?, UsageDate::parse(end)?)
    }

    pub fn single(day: UsageDate) -> Self {
        Self {
            start: day.clone(),
            end: day,
        }
    }

    pub fn start(&self) -> &UsageDate {
        &self.start
    }

    pub fn end(&self) -> &UsageDate {
        &self.end
    }

    pub fn contains(&self, day: &UsageDate) -> bool {
        &self.start <= day && day <= &self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end.to_naive() - self.start.to_naive()).num_days() + 1
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
