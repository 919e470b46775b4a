//! Mutable state threaded through one simulation run.

use chrono::NaiveDateTime;
use log::debug;

use crate::{
    DutyStatus, HoursDelta, HoursOfServiceState, RouteLeg, Stop, StopType, TimeFormatter,
};

use super::limits::{BREAK_DURATION, FUEL_DURATION, FUEL_INTERVAL, RESET_DURATION};

/// Counters, clock and emitted stops for one planning call.
#[derive(Debug, Clone)]
pub(crate) struct SimulationContext {
    clock: NaiveDateTime,
    /// Driving since the last break or reset.
    pub(crate) driving_used: f64,
    /// Driving since the last reset.
    pub(crate) window_driving: f64,
    /// On-duty time since the last reset, driving included.
    pub(crate) duty_used: f64,
    /// Trip-wide on-duty time, driving included.
    pub(crate) on_duty_hours: f64,
    /// Trip-wide distance driven so far, in miles.
    pub(crate) distance_driven: f64,
    /// Every simulated hour, driving and stopped.
    pub(crate) elapsed_hours: f64,
    stops: Vec<Stop>,
}

impl SimulationContext {
    /// Seed the counters from the driver's recorded usage.
    pub(crate) const fn new(start: NaiveDateTime, hours: &HoursOfServiceState) -> Self {
        Self {
            clock: start,
            driving_used: hours.driving_used,
            window_driving: hours.driving_used,
            duty_used: hours.daily_used,
            on_duty_hours: 0.0,
            distance_driven: 0.0,
            elapsed_hours: 0.0,
            stops: Vec::new(),
        }
    }

    /// Emit a stop at the current clock and advance past it.
    ///
    /// ON_DUTY stops count against the duty window.
    pub(crate) fn stop(
        &mut self,
        stop_type: StopType,
        location: String,
        duration_hours: f64,
        duty_status: DutyStatus,
    ) {
        let arrived_at = self.clock;
        let departed_at = TimeFormatter::advance(arrived_at, duration_hours);
        debug!(
            "{stop_type} at {location:?} for {duration_hours}h ({})",
            TimeFormatter::label(arrived_at)
        );
        self.stops.push(Stop {
            stop_type,
            location,
            arrival_time: TimeFormatter::label(arrived_at),
            departure_time: TimeFormatter::label(departed_at),
            duration_hours,
            duty_status,
            arrived_at,
            departed_at,
        });
        self.clock = departed_at;
        self.elapsed_hours += duration_hours;
        if duty_status == DutyStatus::OnDuty {
            self.duty_used += duration_hours;
            self.on_duty_hours += duration_hours;
        }
    }

    /// Thirty-minute break; clears the break counter only.
    pub(crate) fn take_break(&mut self, location: String) {
        self.stop(StopType::Rest, location, BREAK_DURATION, DutyStatus::OnDuty);
        self.driving_used = 0.0;
    }

    /// Ten-hour reset; opens a fresh duty window.
    pub(crate) fn reset(&mut self, location: String) {
        self.stop(
            StopType::Overnight,
            location,
            RESET_DURATION,
            DutyStatus::Sleeper,
        );
        self.driving_used = 0.0;
        self.window_driving = 0.0;
        self.duty_used = 0.0;
    }

    /// Fuel stop; leaves the driving counters alone.
    pub(crate) fn refuel(&mut self, location: String) {
        self.stop(StopType::Fuel, location, FUEL_DURATION, DutyStatus::OnDuty);
    }

    /// Drive for `hours` covering `miles`.
    ///
    /// Returns how many fuel-interval boundaries the increment crossed.
    pub(crate) fn drive(&mut self, hours: f64, miles: f64) -> u32 {
        let before = self.distance_driven;
        self.clock = TimeFormatter::advance(self.clock, hours);
        self.elapsed_hours += hours;
        self.driving_used += hours;
        self.window_driving += hours;
        self.duty_used += hours;
        self.on_duty_hours += hours;
        self.distance_driven += miles;
        let crossed = (self.distance_driven / FUEL_INTERVAL).floor() - (before / FUEL_INTERVAL).floor();
        if crossed > 0.0 { crossed as u32 } else { 0 }
    }

    /// Usage to record once the plan is accepted.
    pub(crate) const fn usage(&self) -> HoursDelta {
        HoursDelta {
            cycle_hours: self.on_duty_hours,
            daily_used: self.duty_used,
            driving_used: self.window_driving,
        }
    }

    /// Stops emitted so far.
    pub(crate) fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Consume the context, yielding the emitted stops.
    pub(crate) fn into_stops(self) -> Vec<Stop> {
        self.stops
    }
}

/// Remaining distance and time on the leg being driven.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LegProgress<'a> {
    pub(crate) leg: &'a RouteLeg,
    pub(crate) remaining_distance: f64,
    pub(crate) remaining_duration: f64,
}

impl<'a> LegProgress<'a> {
    pub(crate) const fn start(leg: &'a RouteLeg) -> Self {
        Self {
            leg,
            remaining_distance: leg.distance_miles,
            remaining_duration: leg.duration_hours,
        }
    }

    /// Fraction of the leg already covered.
    pub(crate) fn completion(&self) -> f64 {
        if self.leg.distance_miles > 0.0 {
            1.0 - self.remaining_distance / self.leg.distance_miles
        } else {
            1.0
        }
    }

    /// Miles covered by `hours` at the leg-average speed of what remains.
    pub(crate) fn miles_for(&self, hours: f64) -> f64 {
        hours / self.remaining_duration * self.remaining_distance
    }

    pub(crate) fn advance(&mut self, hours: f64, miles: f64) {
        self.remaining_duration -= hours;
        self.remaining_distance -= miles;
    }
}
