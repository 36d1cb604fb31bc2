use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{LedgerError, Result};

const CALENDAR_FORMAT: &str = "%Y-%m-%d";

/// calendar date with no time-of-day. Every date that enters the ledger is
/// reduced to one of these before any day arithmetic happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerDate(NaiveDate);

impl LedgerDate {
    pub fn new(date: NaiveDate) -> Self {
        LedgerDate(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(LedgerDate)
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
            })
    }

    /// parse a stored date.
    ///
    /// `YYYY-MM-DD` is read literally. Strings carrying a time component keep
    /// the calendar day as written, any offset is ignored rather than applied,
    /// so the result never depends on the reader's timezone.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, CALENDAR_FORMAT) {
            return Ok(LedgerDate(date));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(LedgerDate(dt.naive_local().date()));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(LedgerDate(dt.date()));
            }
        }

        Err(LedgerError::InvalidDate {
            message: format!("unrecognised date '{input}'"),
        })
    }

    /// epoch milliseconds, mapped to the UTC calendar day
    pub fn from_timestamp_millis(millis: i64) -> Result<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|dt| LedgerDate(dt.date_naive()))
            .ok_or_else(|| LedgerError::InvalidDate {
                message: format!("timestamp {millis} out of range"),
            })
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        LedgerDate(dt.date_naive())
    }

    /// today according to the supplied clock
    pub fn today(time_provider: &SafeTimeProvider) -> Self {
        Self::from_datetime(time_provider.now())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// signed whole days from `self` to `other`
    pub fn days_until(&self, other: LedgerDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// epoch millis of 00:00:00 UTC on this day
    pub fn start_of_day_millis(&self) -> i64 {
        self.0.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
    }

    /// epoch millis of 23:59:59 UTC on this day
    pub fn end_of_day_millis(&self) -> i64 {
        self.start_of_day_millis() + 86_399_000
    }

    /// display form used in summaries (dd/mm/yyyy)
    pub fn display(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }
}

/// signed day count between two calendar dates
pub fn days_between(start: LedgerDate, end: LedgerDate) -> i64 {
    start.days_until(end)
}

/// day count clamped at zero, so an end before the start counts as no time
pub fn elapsed_days(start: LedgerDate, end: LedgerDate) -> u32 {
    let days = days_between(start, end).max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CALENDAR_FORMAT))
    }
}

impl FromStr for LedgerDate {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        LedgerDate::parse(s)
    }
}

impl From<NaiveDate> for LedgerDate {
    fn from(date: NaiveDate) -> Self {
        LedgerDate(date)
    }
}

impl Serialize for LedgerDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct LedgerDateVisitor;

impl<'de> Visitor<'de> for LedgerDateVisitor {
    type Value = LedgerDate;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a YYYY-MM-DD string, a timestamp string or epoch milliseconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<LedgerDate, E> {
        LedgerDate::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<LedgerDate, E> {
        LedgerDate::from_timestamp_millis(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<LedgerDate, E> {
        let millis = i64::try_from(v).map_err(E::custom)?;
        self.visit_i64(millis)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<LedgerDate, E> {
        if !v.is_finite() {
            return Err(E::custom("timestamp is not finite"));
        }
        self.visit_i64(v.trunc() as i64)
    }
}

impl<'de> Deserialize<'de> for LedgerDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(LedgerDateVisitor)
    }
}
