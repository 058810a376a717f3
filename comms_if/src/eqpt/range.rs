//! # Rangefinder interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An ultrasonic (time of flight) rangefinder.
pub trait RangeFinder {
    /// Trigger one ping and wait for its echo.
    ///
    /// Units: centimeters
    fn trigger_and_measure(&mut self) -> Result<f64, RangeError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RangeError {
    /// No echo arrived before the receive timeout.
    #[error("No echo received")]
    NoEcho,
}
