//! Accumulated duty-time usage for one driver on one day.
//!
//! The record is owned by an external store. The planner loads a copy, hands
//! a snapshot to the engine and applies the resulting [`HoursDelta`] only
//! once the trip has been accepted.

use chrono::NaiveDate;

use crate::engine::limits::{MAX_CYCLE, MAX_DRIVING, MAX_DUTY};

/// Per-driver, per-day usage against the three regulatory limits.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use hos_core::HoursOfServiceState;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
/// let hours = HoursOfServiceState::new("driver-1", date);
/// assert!(!hours.is_over_daily_limit());
/// assert!(!hours.is_over_cycle_limit());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoursOfServiceState {
    /// Driver the record belongs to.
    pub driver: String,
    /// Calendar day the usage is recorded against.
    pub date: NaiveDate,
    /// Hours used in the rolling 70-hour/8-day cycle.
    pub cycle_used: f64,
    /// Hours used in the 14-hour daily duty window.
    pub daily_used: f64,
    /// Hours used against the 11-hour driving limit.
    pub driving_used: f64,
}

/// Usage produced by one accepted trip plan.
///
/// The engine seeds its counters from the driver's record, so the daily
/// window figures are that record's values at the end of the trip. A
/// ten-hour reset along the way restarts the window. Cycle hours are added
/// to whatever the record already holds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoursDelta {
    /// On-duty hours the trip spent, driving included.
    pub cycle_hours: f64,
    /// Duty hours in the daily window when the trip ends.
    pub daily_used: f64,
    /// Driving hours in the daily window when the trip ends.
    pub driving_used: f64,
}

impl HoursOfServiceState {
    /// Create a zeroed record, as the store does for a driver's first
    /// request of the day.
    pub fn new(driver: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            driver: driver.into(),
            date,
            cycle_used: 0.0,
            daily_used: 0.0,
            driving_used: 0.0,
        }
    }

    /// Replace the usage figures, keeping driver and date.
    #[must_use]
    pub fn with_usage(mut self, cycle_used: f64, daily_used: f64, driving_used: f64) -> Self {
        self.cycle_used = cycle_used;
        self.daily_used = daily_used;
        self.driving_used = driving_used;
        self
    }

    /// Whether driving or daily duty usage exceeds its limit.
    #[must_use]
    pub fn is_over_daily_limit(&self) -> bool {
        self.driving_used > MAX_DRIVING || self.daily_used > MAX_DUTY
    }

    /// Whether the 70-hour cycle is exceeded.
    #[must_use]
    pub fn is_over_cycle_limit(&self) -> bool {
        self.cycle_used > MAX_CYCLE
    }

    /// Name of the first usage field that is negative or not finite.
    ///
    /// The engine cannot reason about such values, so callers reject the
    /// record before simulating.
    #[must_use]
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("cycle_used", self.cycle_used),
            ("daily_used", self.daily_used),
            ("driving_used", self.driving_used),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
        .map(|(name, _)| name)
    }

    /// Record an accepted trip's usage.
    ///
    /// `delta` must come from a plan simulated against this record: its
    /// closing window replaces the daily figures and its on-duty hours are
    /// added to the cycle.
    pub fn apply(&mut self, delta: HoursDelta) {
        self.driving_used = delta.driving_used;
        self.daily_used = delta.daily_used;
        self.cycle_used += delta.cycle_hours;
    }
}
