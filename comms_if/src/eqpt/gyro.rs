//! # Rate gyroscope interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single-axis (yaw) rate gyroscope.
///
/// Rates are positive clockwise when seen from above, the same sense as compass headings, so the
/// device must be mounted (or its driver must flip the sign) accordingly.
pub trait RateGyro {
    /// Sensitivity of the raw reading.
    ///
    /// Units: LSB per degree/second
    const LSB_PER_DPS: f64 = 131.0;

    /// Read the device's identity register.
    fn identify(&mut self) -> Result<u8, ImuError>;

    /// Wake the device and configure it for rate measurement.
    fn configure(&mut self) -> Result<(), ImuError>;

    /// Issue a device reset. The device must be configured again afterwards.
    fn reset(&mut self) -> Result<(), ImuError>;

    /// Read the raw yaw rate register.
    fn read_raw_rate_z(&mut self) -> Result<i16, ImuError>;

    /// Read the yaw rate.
    ///
    /// Units: degrees/second
    fn read_rate_z_dps(&mut self) -> Result<f64, ImuError> {
        self.read_raw_rate_z()
            .map(|raw| raw as f64 / Self::LSB_PER_DPS)
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImuError {
    #[error("The device did not acknowledge")]
    NoAck,

    #[error("Bus error: {0}")]
    Bus(String),
}
