//! # Pan servo interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Positional servo carrying the rangefinder.
///
/// 90 degrees points straight ahead, larger angles point left.
pub trait PanServo {
    /// Command the servo to the given angle. Returns as soon as the command is issued, the servo
    /// takes some time to actually get there.
    fn set_angle_deg(&mut self, angle_deg: i32) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServoError {
    #[error("Angle {0} is outside the servo's range")]
    OutOfRange(i32),

    #[error("Could not write the servo output: {0}")]
    Output(String),
}
