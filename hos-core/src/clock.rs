//! Wall-clock arithmetic for the simulation.
//!
//! [`TimeFormatter`] advances a timestamp by fractional hours and renders the
//! 12-hour labels printed on stops. [`Clock`] abstracts "now" so plans are
//! reproducible under test.

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

/// `strftime` pattern for stop labels.
pub const LABEL_FORMAT: &str = "%I:%M %p";

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Source of the simulation start time.
pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// [`Clock`] reading the host's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Renders and compares wall-clock labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeFormatter;

impl TimeFormatter {
    /// Move `at` forward by `hours`, at microsecond resolution.
    ///
    /// Saturates at [`NaiveDateTime::MAX`] rather than overflowing.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use hos_core::TimeFormatter;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 3, 1)
    ///     .and_then(|d| d.and_hms_opt(23, 0, 0))
    ///     .expect("valid timestamp");
    /// let later = TimeFormatter::advance(start, 1.5);
    /// assert_eq!(TimeFormatter::label(later), "12:30 AM");
    /// ```
    #[must_use]
    pub fn advance(at: NaiveDateTime, hours: f64) -> NaiveDateTime {
        let micros = (hours * MICROS_PER_HOUR).round() as i64;
        at.checked_add_signed(TimeDelta::microseconds(micros))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Render the 12-hour label for `at`.
    #[must_use]
    pub fn label(at: NaiveDateTime) -> String {
        at.format(LABEL_FORMAT).to_string()
    }

    /// Time of day as shown on a label, truncated to whole minutes.
    #[must_use]
    pub fn label_time(at: NaiveDateTime) -> NaiveTime {
        NaiveTime::from_hms_opt(at.hour(), at.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// Hours between two labels using the single-rollover rule.
    ///
    /// Only the time of day is compared. When `end` reads earlier than
    /// `start`, one day is added; further day crossings are not visible in
    /// the labels and are not counted.
    #[must_use]
    pub fn label_span_hours(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
        let from = Self::label_time(start);
        let to = Self::label_time(end);
        let hours = (to - from).num_minutes() as f64 / 60.0;
        if to < from { hours + HOURS_PER_DAY } else { hours }
    }
}
