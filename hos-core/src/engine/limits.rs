//! Regulatory thresholds and fixed stop durations, in hours and miles.

/// Maximum driving hours per duty window.
pub const MAX_DRIVING: f64 = 11.0;
/// Maximum on-duty hours before a reset.
pub const MAX_DUTY: f64 = 14.0;
/// Rolling 70-hour/8-day cycle limit.
pub const MAX_CYCLE: f64 = 70.0;
/// Cumulative driving since the last break or reset that forces a break.
pub const BREAK_AFTER: f64 = 8.0;
/// Length of a REST stop.
pub const BREAK_DURATION: f64 = 0.5;
/// Length of an OVERNIGHT reset.
pub const RESET_DURATION: f64 = 10.0;
/// Distance between FUEL stops.
pub const FUEL_INTERVAL: f64 = 1000.0;
/// Length of a FUEL stop.
pub const FUEL_DURATION: f64 = 0.25;
/// Time spent loading at the pickup.
pub const PICKUP_DURATION: f64 = 1.0;
/// Time spent unloading at the dropoff.
pub const DROPOFF_DURATION: f64 = 1.0;
/// Slack kept below [`MAX_DUTY`] when deciding whether to drive on.
pub const OVERNIGHT_MARGIN: f64 = 0.5;
