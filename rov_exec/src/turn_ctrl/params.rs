//! Parameters structure for TurnCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TurnCtrlParams {
    /// Slowest pivot duty.
    pub min_speed: u8,

    /// Fastest pivot duty.
    pub max_speed: u8,

    /// Errors up to this get the minimum speed.
    ///
    /// Units: degrees
    pub dead_band_deg: f64,

    /// Upper end of the fine ramp.
    ///
    /// Units: degrees
    pub fine_band_deg: f64,

    /// Upper end of the coarse ramp, above which the maximum speed is used.
    ///
    /// Units: degrees
    pub coarse_band_deg: f64,

    /// Speed added over the fine ramp.
    pub fine_ramp: f64,

    /// Speed added over the coarse ramp.
    pub coarse_ramp: f64,

    /// Errors listed by the `speed_test` diagnostic.
    ///
    /// Units: degrees
    pub speed_test_errors_deg: Vec<f64>,
}

impl Default for TurnCtrlParams {
    fn default() -> Self {
        Self {
            min_speed: 100,
            max_speed: 180,
            dead_band_deg: 8.0,
            fine_band_deg: 20.0,
            coarse_band_deg: 45.0,
            fine_ramp: 25.0,
            coarse_ramp: 25.0,
            speed_test_errors_deg: vec![5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0, 180.0],
        }
    }
}
