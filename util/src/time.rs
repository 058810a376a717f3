//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Number of milliseconds in a second
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a number of seconds into whole milliseconds, saturating at zero for negative
/// inputs.
pub fn seconds_to_millis(seconds: f64) -> u32 {
    if seconds <= 0.0 || seconds.is_nan() {
        0
    }
    else {
        (seconds * MILLIS_PER_SECOND).round() as u32
    }
}
