//! Stops emitted by the segmentation engine.

use std::fmt;

use chrono::NaiveDateTime;

/// Why the driver stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StopType {
    /// Trip origin.
    Start,
    /// Cargo collection.
    Pickup,
    /// Cargo delivery; always the final stop.
    Dropoff,
    /// Thirty-minute break after eight hours of driving.
    Rest,
    /// Ten-hour reset once the duty window is exhausted.
    Overnight,
    /// Refuelling every thousand miles.
    Fuel,
}

impl StopType {
    /// Stable identifier used by stores and serialised output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Pickup => "PICKUP",
            Self::Dropoff => "DROPOFF",
            Self::Rest => "REST",
            Self::Overnight => "OVERNIGHT",
            Self::Fuel => "FUEL",
        }
    }

    /// Parse the identifier produced by [`StopType::as_str`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        [
            Self::Start,
            Self::Pickup,
            Self::Dropoff,
            Self::Rest,
            Self::Overnight,
            Self::Fuel,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for StopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory categorisation of a time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DutyStatus {
    /// Relieved of all duty.
    OffDuty,
    /// Working but not driving.
    OnDuty,
    /// Behind the wheel.
    Driving,
    /// Resting in the sleeper berth.
    Sleeper,
}

impl DutyStatus {
    /// Stable identifier used by stores and serialised output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OffDuty => "OFF_DUTY",
            Self::OnDuty => "ON_DUTY",
            Self::Driving => "DRIVING",
            Self::Sleeper => "SLEEPER",
        }
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stop on the planned trip.
///
/// Labels are 12-hour wall-clock strings; the matching timestamps are kept so
/// consumers can order stops across midnight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Kind of stop.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub stop_type: StopType,
    /// Human-readable location.
    pub location: String,
    /// Arrival label, e.g. `"08:30 AM"`.
    pub arrival_time: String,
    /// Departure label.
    pub departure_time: String,
    /// Time spent at the stop in hours.
    pub duration_hours: f64,
    /// Duty status while stopped.
    pub duty_status: DutyStatus,
    /// Simulated arrival instant.
    pub arrived_at: NaiveDateTime,
    /// Simulated departure instant.
    pub departed_at: NaiveDateTime,
}
