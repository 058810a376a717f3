//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control. Speeds are PWM duties out of 255.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveCtrlParams {
    /// Duty for straight driving, and for the outer wheel of an arc.
    pub normal_speed: u8,

    /// Duty for both wheels during a bounded pivot.
    pub pivot_speed: u8,

    /// Duty for the inner wheel of an arc.
    pub curve_speed: u8,

    /// Length of a bounded pivot, roughly a quarter turn.
    ///
    /// Units: seconds
    pub pivot_duration_s: f64,
}

impl Default for DriveCtrlParams {
    fn default() -> Self {
        Self {
            normal_speed: 200,
            pivot_speed: 220,
            curve_speed: 140,
            pivot_duration_s: 0.2,
        }
    }
}
