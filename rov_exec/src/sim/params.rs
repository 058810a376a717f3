//! Parameters structure for the simulated platform

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {

    // ---- LOCATION ----

    /// Geographic position of the local frame's origin, where the rover starts.
    ///
    /// Units: degrees
    pub origin_lat_deg: f64,

    /// Units: degrees
    pub origin_lng_deg: f64,

    /// Initial heading, clockwise from north.
    ///
    /// Units: degrees
    pub initial_heading_deg: f64,

    // ---- DRIVETRAIN ----

    /// Distance between the two wheels.
    ///
    /// Units: meters
    pub wheel_base_m: f64,

    /// Ground speed of a wheel driven at full duty.
    ///
    /// Units: meters/second
    pub max_wheel_speed_mps: f64,

    // ---- SENSORS ----

    /// Constant bias added to the simulated gyro rate.
    ///
    /// Units: degrees/second
    pub gyro_bias_dps: f64,

    /// Identity reported by the simulated gyro.
    pub gyro_identity: u8,

    /// Period between two satellite fixes.
    ///
    /// Units: seconds
    pub gnss_period_s: f64,

    /// Time after startup before the receiver locks.
    ///
    /// Units: seconds
    pub gnss_lock_delay_s: f64,

    /// Sleep for real in delays, disable to run faster than real time.
    pub realtime_delays: bool,

    // ---- WORLD ----

    /// Radius of the circular wall around the origin.
    ///
    /// Units: meters
    pub arena_radius_m: f64,

    pub obstacles: Vec<SimObstacle>,
}

/// A round obstacle, positioned in the local frame (x east, y north).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimObstacle {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Units: meters
    pub radius_m: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            origin_lat_deg: 48.0,
            origin_lng_deg: 2.0,
            initial_heading_deg: 0.0,
            wheel_base_m: 0.3,
            max_wheel_speed_mps: 0.3,
            gyro_bias_dps: 0.8,
            gyro_identity: 0x68,
            gnss_period_s: 1.0,
            gnss_lock_delay_s: 2.0,
            realtime_delays: true,
            arena_radius_m: 50.0,
            obstacles: Vec::new(),
        }
    }
}
