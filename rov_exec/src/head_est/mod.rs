//! # Heading Estimator module
//!
//! Dead-reckons the rover's compass heading by integrating the yaw rate of a single gyro. There is
//! no absolute reference, so the heading is relative to the orientation the rover had when it was
//! last calibrated, which is taken as north.
//!
//! The estimator moves through the following modes:
//!
//! - `Uninitialised` - nothing has been attempted yet
//! - `Calibrating` - averaging stationary samples into the rate bias
//! - `Tracking` - integrating, the heading is usable
//! - `Faulted` - the device failed to identify itself or could not be read during calibration.
//!   Only the `mpu_reset` command can leave this mode.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::HeadEstParams;
pub use state::*;

use comms_if::eqpt::ImuError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadEstMode {
    Uninitialised,
    Calibrating,
    Tracking,
    Faulted,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum HeadEstError {
    #[error("The gyro did not respond to the handshake: {0}")]
    NoResponse(ImuError),

    #[error("The gyro reported an unexpected identity (0x{0:02X})")]
    UnexpectedIdentity(u8),

    #[error("Could not configure the gyro: {0}")]
    ConfigureFailed(ImuError),

    #[error("Could not reset the gyro: {0}")]
    ResetFailed(ImuError),

    #[error("Calibration failed: {0}")]
    CalibrationFailed(ImuError),

    #[error("Could not read the gyro rate: {0}")]
    ReadFailed(ImuError),

    #[error("The estimator is not tracking (mode: {0:?})")]
    NotTracking(HeadEstMode),
}

impl std::fmt::Display for HeadEstMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
