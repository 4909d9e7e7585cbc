//! Recurring weekly schedule values and their resolution to absolute
//! instants.
//!
//! A [`WeeklyWindow`] is a periodic value (weekday + local wall-clock times),
//! not a concrete interval. It is stored without a calendar date precisely
//! because a fixed UTC offset would drift across daylight-saving
//! transitions; it only becomes an [`Interval`] through [`WeeklyWindow::resolve`]
//! against a concrete date and the business's IANA zone.
//!
//! DST policy: a local wall-clock time that does not exist on the given date
//! (spring-forward gap) is rejected with [`LocalTimeError::Nonexistent`]; an
//! ambiguous time (fall-back repeat) resolves to the earlier offset.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interval::Interval;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocalTimeError {
    #[error("local time {time} does not exist on {date} in zone {zone}")]
    Nonexistent {
        date: NaiveDate,
        time: NaiveTime,
        zone: Tz,
    },

    #[error("window start {start} is not before end {end}")]
    InvertedWindow { start: NaiveTime, end: NaiveTime },

    #[error("unknown IANA timezone: {0}")]
    UnknownZone(String),
}

/// Parses an IANA zone name (e.g. "America/New_York").
pub fn parse_zone(name: &str) -> Result<Tz, LocalTimeError> {
    name.parse::<Tz>()
        .map_err(|_| LocalTimeError::UnknownZone(name.to_string()))
}

/// Resolves a local wall-clock time on a calendar date to a UTC instant.
///
/// Ambiguous times (fall-back) take the earlier offset; nonexistent times
/// (spring-forward) are an error.
pub fn resolve_local(
    date: NaiveDate,
    time: NaiveTime,
    zone: Tz,
) -> Result<DateTime<Utc>, LocalTimeError> {
    match zone.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => Err(LocalTimeError::Nonexistent { date, time, zone }),
    }
}

/// The business-local calendar date of an absolute instant.
pub fn local_date(instant: DateTime<Utc>, zone: Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Weekday index used in storage: 0 = Monday .. 6 = Sunday.
pub fn weekday_index(weekday: Weekday) -> i16 {
    weekday.num_days_from_monday() as i16
}

pub fn weekday_from_index(index: i16) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// A recurring weekly window in local wall-clock time.
///
/// Used for provider availability, provider unavailability, and business
/// hours alike; which table it came from is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WeeklyWindow {
    pub fn new(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Result<Self, LocalTimeError> {
        if start >= end {
            return Err(LocalTimeError::InvertedWindow { start, end });
        }
        Ok(Self {
            weekday,
            start,
            end,
        })
    }

    /// Whether `other` lies entirely within this window on the same weekday.
    /// Wall-clock containment only; used at the availability mutation edges.
    pub fn encloses(&self, other: &WeeklyWindow) -> bool {
        self.weekday == other.weekday && self.start <= other.start && other.end <= self.end
    }

    /// Resolves this window against a concrete calendar date, producing an
    /// absolute UTC interval.
    ///
    /// The date's weekday is taken as given; callers select the windows
    /// matching the date before resolving.
    pub fn resolve(&self, date: NaiveDate, zone: Tz) -> Result<Interval, LocalTimeError> {
        let start = resolve_local(date, self.start, zone)?;
        let end = resolve_local(date, self.end, zone)?;
        Interval::new(start, end).ok_or(LocalTimeError::InvertedWindow {
            start: self.start,
            end: self.end,
        })
    }
}
