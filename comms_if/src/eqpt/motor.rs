//! # Motor driver interface
//!
//! Demands for a dual H-bridge driving the left and right wheels of a differential drive rover.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait MotorDriver {
    /// Write the demands to the bridge outputs.
    fn set_outputs(&mut self, dems: &MotorDems) -> Result<(), MotorError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorDems {
    /// Driver standby pin. If false both bridges are disabled whatever the wheel demands.
    pub enabled: bool,

    pub left: WheelDem,

    pub right: WheelDem,
}

/// Demand for one side of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelDem {
    pub dir: WheelDir,

    /// PWM duty, 0 to 255.
    pub duty: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDir {
    Forward,
    Backward,

    /// Both bridge inputs low, the wheel is free.
    Coast,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotorError {
    #[error("Could not write the motor outputs: {0}")]
    Output(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorDems {
    /// Both wheels coasting with zero duty, driver disabled.
    pub fn stopped() -> Self {
        Self {
            enabled: false,
            left: WheelDem::coast(),
            right: WheelDem::coast(),
        }
    }

    /// Build an enabled demand from a pair of wheel demands.
    pub fn drive(left: WheelDem, right: WheelDem) -> Self {
        Self {
            enabled: true,
            left,
            right,
        }
    }

    /// True if either wheel is being driven.
    pub fn is_moving(&self) -> bool {
        self.enabled && (self.left.is_driven() || self.right.is_driven())
    }
}

impl Default for MotorDems {
    fn default() -> Self {
        Self::stopped()
    }
}

impl WheelDem {
    pub fn forward(duty: u8) -> Self {
        Self { dir: WheelDir::Forward, duty }
    }

    pub fn backward(duty: u8) -> Self {
        Self { dir: WheelDir::Backward, duty }
    }

    pub fn coast() -> Self {
        Self { dir: WheelDir::Coast, duty: 0 }
    }

    pub fn is_driven(&self) -> bool {
        self.dir != WheelDir::Coast && self.duty > 0
    }

    /// Signed duty as a fraction of full power, positive forwards.
    pub fn signed_fraction(&self) -> f64 {
        let frac = self.duty as f64 / u8::MAX as f64;
        match self.dir {
            WheelDir::Forward => frac,
            WheelDir::Backward => -frac,
            WheelDir::Coast => 0.0
        }
    }
}
