use chrono::{Datelike, Months, NaiveDateTime};
use std::fmt;
use tracing::warn;

/// Format of every `start`/`stop` timestamp stored in a timelog file
pub const TIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used to generate plan ids from the creation time
pub const PLAN_ID_FMT: &str = "%Y%m%d%H%M%S";

/// Format a point in time as a record timestamp
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIME_FMT).to_string()
}

/// Parse a record timestamp, `None` if it doesn't match `fmt`
pub fn parse_timestamp(value: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, fmt).ok()
}

/// Split "YYYY-MM-DD HH:MM:SS" into its date and time halves.
/// Strings without a space are returned as (value, "").
pub fn split_date_time(value: &str) -> (&str, &str) {
    match value.split_once(' ') {
        Some((date, time)) => (date, time),
        None => (value, ""),
    }
}

/// Calendar breakdown of the interval between two timestamps.
///
/// Each field is the leftover after the larger units are removed, so
/// `start + (years * 12 + months) months + days/hours/minutes/seconds == stop`.
/// For a negative interval every component is non-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedParts {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl ElapsedParts {
    pub fn between(start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        if stop < start {
            return Self::between(stop, start).negated();
        }

        // Whole months first. The estimate can overshoot by one when the
        // day-of-month of `stop` is earlier than that of `start`.
        let estimate = (stop.year() - start.year()) * 12 + stop.month() as i32 - start.month() as i32;
        let mut months = estimate.max(0) as u32;
        let anchor = loop {
            match start.checked_add_months(Months::new(months)) {
                Some(candidate) if candidate <= stop => break candidate,
                _ if months == 0 => break start,
                _ => months -= 1,
            }
        };

        let rest = stop - anchor;
        Self {
            years: i64::from(months / 12),
            months: i64::from(months % 12),
            days: rest.num_days(),
            hours: rest.num_hours() % 24,
            minutes: rest.num_minutes() % 60,
            seconds: rest.num_seconds() % 60,
        }
    }

    fn negated(self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }

    /// Zero a negative seconds component. Returns true if it was clamped.
    pub fn clamp_seconds(&mut self) -> bool {
        if self.seconds >= 0 {
            return false;
        }
        self.seconds = 0;
        true
    }

    /// Apply the breakdown to `start` (inverse of `between` for forward intervals)
    pub fn add_to(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let total_months = u32::try_from(self.years * 12 + self.months).ok()?;
        let anchor = start.checked_add_months(Months::new(total_months))?;
        let rest = chrono::Duration::days(self.days)
            + chrono::Duration::hours(self.hours)
            + chrono::Duration::minutes(self.minutes)
            + chrono::Duration::seconds(self.seconds);
        anchor.checked_add_signed(rest)
    }
}

impl fmt::Display for ElapsedParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.years, self.months, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Elapsed time between two timestamps as "YYYY-MM-DD HH:MM:SS".
///
/// Returns an empty string when either side fails to parse with `fmt`; callers
/// treat that as "no duration" and show the raw values instead.
pub fn time_sub(start: &str, stop: &str, fmt: &str) -> String {
    let (Some(start_at), Some(stop_at)) = (parse_timestamp(start, fmt), parse_timestamp(stop, fmt)) else {
        return String::new();
    };

    let mut parts = ElapsedParts::between(start_at, stop_at);
    if parts.clamp_seconds() {
        warn!(start, stop, "negative interval, clamping seconds to zero");
    }
    parts.to_string()
}
