//! Parameters structures for NavArb

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    drive_ctrl::DriveCtrlParams, 
    head_est::HeadEstParams, 
    obs_scan::ObsScanParams, 
    turn_ctrl::TurnCtrlParams
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NavArbParams {
    /// Distance to the waypoint at which navigation is complete.
    ///
    /// Units: meters
    pub arrival_distance_m: f64,

    /// Heading errors up to this are driven through without turning.
    ///
    /// Units: degrees
    pub heading_tolerance_deg: f64,

    /// Heading error mapped to the shortest turn.
    ///
    /// Units: degrees
    pub turn_error_min_deg: f64,

    /// Heading error mapped to the longest turn.
    ///
    /// Units: degrees
    pub turn_error_max_deg: f64,

    /// Units: seconds
    pub min_turn_duration_s: f64,

    /// Units: seconds
    pub max_turn_duration_s: f64,

    /// Time to wait after a turn before the heading is assessed again.
    ///
    /// Units: seconds
    pub settle_duration_s: f64,

    /// Oldest position fix navigation may rely on.
    ///
    /// Units: seconds
    pub max_fix_age_s: f64,

    /// Navigation is abandoned if the waypoint has not been reached after this long.
    ///
    /// Units: seconds
    pub max_nav_duration_s: f64,
}

/// Parameters of the arbiter and every module it owns.
#[derive(Debug, Clone, Default)]
pub struct ArbParams {
    pub nav_arb: NavArbParams,
    pub head_est: HeadEstParams,
    pub obs_scan: ObsScanParams,
    pub drive_ctrl: DriveCtrlParams,
    pub turn_ctrl: TurnCtrlParams,
}

impl Default for NavArbParams {
    fn default() -> Self {
        Self {
            arrival_distance_m: 3.0,
            heading_tolerance_deg: 6.0,
            turn_error_min_deg: 8.0,
            turn_error_max_deg: 180.0,
            min_turn_duration_s: 0.2,
            max_turn_duration_s: 1.0,
            settle_duration_s: 0.15,
            max_fix_age_s: 5.0,
            max_nav_duration_s: 600.0,
        }
    }
}
