//! Parameters structure for ObsScan

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the obstacle scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct ObsScanParams {

    // ---- DISTANCES ----

    /// Distances at or below this are obstacles.
    ///
    /// Units: centimeters
    pub obstacle_threshold_cm: f64,

    /// Readings above this are treated as invalid.
    ///
    /// Units: centimeters
    pub max_valid_range_cm: f64,

    /// Distance reported for invalid readings.
    ///
    /// Units: centimeters
    pub invalid_distance_cm: f64,

    /// Number of consecutive unanswered periodic pings after which the sensor is considered
    /// unavailable. Zero disables the check.
    pub max_consec_timeouts: u32,

    // ---- TIMING ----

    /// Period of the straight-ahead measurements.
    ///
    /// Units: seconds
    pub measure_period_s: f64,

    /// Time given to the servo to reach a new angle before measuring.
    ///
    /// Units: milliseconds
    pub servo_settle_ms: u32,

    /// Pause between two directions of a full sweep.
    ///
    /// Units: milliseconds
    pub sweep_pause_ms: u32,

    // ---- SERVO ANGLES ----

    /// Units: degrees
    pub servo_center_deg: i32,

    /// Units: degrees
    pub servo_left_deg: i32,

    /// Units: degrees
    pub servo_right_deg: i32,

    /// Units: degrees
    pub servo_min_deg: i32,

    /// Units: degrees
    pub servo_max_deg: i32,

    /// Units: degrees
    pub sweep_step_deg: i32,
}

impl Default for ObsScanParams {
    fn default() -> Self {
        Self {
            obstacle_threshold_cm: 30.0,
            max_valid_range_cm: 400.0,
            invalid_distance_cm: 999.0,
            max_consec_timeouts: 10,
            measure_period_s: 0.3,
            servo_settle_ms: 1000,
            sweep_pause_ms: 300,
            servo_center_deg: 90,
            servo_left_deg: 150,
            servo_right_deg: 30,
            servo_min_deg: 0,
            servo_max_deg: 180,
            sweep_step_deg: 30,
        }
    }
}
