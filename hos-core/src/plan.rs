//! The engine's output: an ordered stop sequence with trip totals.

use crate::{DutyStatus, HoursDelta, Stop, StopType};

/// A complete HOS-compliant trip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripPlan {
    /// Routed distance across both legs, in miles, to one decimal.
    pub total_distance: f64,
    /// Routed driving time across both legs, in hours, to one decimal.
    pub total_driving_hours: f64,
    /// Label-derived trip span in hours, to one decimal.
    ///
    /// Uses the single-rollover rule, so trips crossing midnight more than
    /// once are undercounted; see [`TripPlan::elapsed_hours`].
    pub total_trip_hours: f64,
    /// Sum of all simulated driving and stop time, in hours.
    pub elapsed_hours: f64,
    /// Driver usage the plan leaves behind, unrounded.
    pub usage: HoursDelta,
    /// Stops in chronological order, from START to DROPOFF.
    pub stops: Vec<Stop>,
    /// Stops other than the first and last.
    pub required_stop_count: usize,
}

/// One interval of a driver's duty log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DutyActivity {
    /// Duty status held for the interval.
    pub status: DutyStatus,
    /// Start label.
    pub start_time: String,
    /// End label.
    pub end_time: String,
    /// What the driver was doing.
    pub description: String,
    /// Where it happened, for stationary activities.
    pub location: Option<String>,
}

impl TripPlan {
    /// Usage this plan adds once accepted.
    #[must_use]
    pub const fn hours_delta(&self) -> HoursDelta {
        self.usage
    }

    /// Count of stops of one kind.
    #[must_use]
    pub fn count_of(&self, kind: StopType) -> usize {
        self.stops
            .iter()
            .filter(|stop| stop.stop_type == kind)
            .count()
    }

    /// Derive the duty-status log for the trip.
    ///
    /// Gaps between one stop's departure and the next stop's arrival are
    /// DRIVING; time spent at a stop carries the stop's own status.
    /// Zero-length stops contribute nothing.
    #[must_use]
    pub fn duty_log(&self) -> Vec<DutyActivity> {
        let mut log = Vec::with_capacity(self.stops.len() * 2);
        let mut previous: Option<&Stop> = None;
        for stop in &self.stops {
            if let Some(prev) = previous
                && prev.departed_at < stop.arrived_at
            {
                log.push(DutyActivity {
                    status: DutyStatus::Driving,
                    start_time: prev.departure_time.clone(),
                    end_time: stop.arrival_time.clone(),
                    description: format!("Driving from {} to {}", prev.location, stop.location),
                    location: None,
                });
            }
            if stop.departed_at > stop.arrived_at {
                log.push(DutyActivity {
                    status: stop.duty_status,
                    start_time: stop.arrival_time.clone(),
                    end_time: stop.departure_time.clone(),
                    description: describe(stop.stop_type).to_owned(),
                    location: Some(stop.location.clone()),
                });
            }
            previous = Some(stop);
        }
        log
    }
}

const fn describe(kind: StopType) -> &'static str {
    match kind {
        StopType::Start => "Pre-trip",
        StopType::Pickup => "Loading at pickup",
        StopType::Dropoff => "Unloading at dropoff",
        StopType::Rest => "30-minute break",
        StopType::Overnight => "10-hour reset",
        StopType::Fuel => "Fuelling",
    }
}

/// Round to one decimal place, as reported totals are.
pub(crate) fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
