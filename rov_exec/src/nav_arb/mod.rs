//! # Navigation Arbiter module
//!
//! The arbiter owns every navigation module (heading estimator, position tracker, obstacle
//! scanner, turn speed controller and drive control) and is the only thing which decides what
//! the motors do. It has three modes:
//!
//! - `Idle` - nothing is moving.
//! - `ManualAvoidance` - a manual motion command is running, under the safety gate.
//! - `AutonomousNav` - driving towards the waypoint. Manual motion is refused, except `stop`.
//!
//! Commands arrive through [`NavArb::exec_cmd`] as discrete events, while [`NavArb::proc`] (via
//! the `State` trait) runs one control cycle: sensors first, then the safety gate, then
//! navigation.
//!
//! While navigating, each heading correction is run as a small phase machine so that the loop is
//! never held: `Assess -> Turning -> Settling -> Assess`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod exec;
mod navigate;
mod params;
mod state;

#[cfg(test)]
mod test;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::{ArbParams, NavArbParams};
pub use state::*;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::{head_est::HeadEstError, obs_scan::ObsScanError};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Driving mode of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavMode {
    Idle,
    ManualAvoidance,
    AutonomousNav,
}

/// Phase of a navigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NavPhase {
    /// Compare the heading with the bearing to the waypoint and pick the next action.
    Assess,

    /// Pivoting towards the waypoint until the given session time.
    Turning { until_s: f64 },

    /// Stopped after a pivot, waiting for the rover to come to rest.
    Settling { until_s: f64 },
}

/// Noteworthy things which happened during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArbEvent {
    /// Navigation reached the waypoint.
    Arrived { distance_m: f64 },

    /// Navigation stopped because the position fix became too old.
    PositionLost { fix_age_s: Option<f64> },

    /// Navigation gave up because it took too long.
    NavTimeout,

    /// Navigation stopped because there is no waypoint.
    NoWaypoint,

    ObstacleDetected { distance_cm: f64 },

    PathClear,

    /// A manual motion was stopped because of an obstacle ahead.
    SafetyStop,
}

/// Errors raised while bringing the arbiter up.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum NavArbError {
    #[error("Could not center the scan head: {0}")]
    ScanHeadInit(ObsScanError),

    #[error("Heading estimator unavailable: {0}")]
    HeadingUnavailable(HeadEstError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl std::fmt::Display for NavMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::fmt::Display for ArbEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArbEvent::Arrived { distance_m } => 
                write!(f, "Arrived at the waypoint ({:.2} m)", distance_m),
            ArbEvent::PositionLost { fix_age_s: Some(age) } => 
                write!(f, "Position lost, last fix {:.1} s old", age),
            ArbEvent::PositionLost { fix_age_s: None } => 
                write!(f, "Position lost, no fix"),
            ArbEvent::NavTimeout => write!(f, "Navigation timed out"),
            ArbEvent::NoWaypoint => write!(f, "No waypoint set"),
            ArbEvent::ObstacleDetected { distance_cm } => 
                write!(f, "Obstacle detected ({:.1} cm)", distance_cm),
            ArbEvent::PathClear => write!(f, "Path clear"),
            ArbEvent::SafetyStop => write!(f, "Safety stop, obstacle ahead"),
        }
    }
}
