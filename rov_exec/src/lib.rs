//! # Rover library.
//!
//! This library allows other crates in the workspace to access items defined inside the rover 
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Heading estimator - integrates the gyro yaw rate into a compass heading
pub mod head_est;

/// Position tracker - keeps the latest satellite fix
pub mod pos_track;

/// Obstacle scanner - drives the rangefinder and its pan servo
pub mod obs_scan;

/// Turn speed controller - maps a heading error to a pivot speed
pub mod turn_ctrl;

/// Drive control - the only writer of the motor outputs
pub mod drive_ctrl;

/// Navigation arbiter - owns everything above and decides what the motors do each cycle
pub mod nav_arb;

/// Wireless command server
pub mod cmd_server;

/// Serial console command reader
pub mod serial_client;

/// Rover executable parameters
pub mod params;

/// Simulated equipment
pub mod sim;

#[cfg(test)]
pub(crate) mod fakes;
