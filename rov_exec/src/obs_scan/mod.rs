//! # Obstacle Scanner module
//!
//! Owns the ultrasonic rangefinder and the pan servo carrying it. Two kinds of measurement are
//! made:
//!
//! - Periodic measurements straight ahead, made from `proc`, which maintain the obstacle state
//!   used by the safety gate.
//! - Directional scans (left/right clearance checks and the full sweep), which are synchronous and
//!   never modify the obstacle state.
//!
//! A reading with no echo, or beyond the maximum valid range, is mapped to the invalid distance
//! and never overwrites the last valid distance. If too many pings in a row go unanswered the
//! sensor is considered unavailable, which counts as blocked.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::ObsScanParams;
pub use state::*;

use comms_if::eqpt::ServoError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ObsScanError {
    #[error("Could not move the scan head: {0}")]
    ServoError(ServoError),

    #[error("The rangefinder is unavailable ({0} pings in a row without an echo)")]
    SensorUnavailable(u32),
}
