//! # Equipment Interface
//!
//! Traits behind which the rover's sensors and actuators sit. The navigation core only ever talks
//! to equipment through these, real drivers and the simulated platform implement them.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod gnss;
pub mod gyro;
pub mod motor;
pub mod range;
pub mod servo;

// -----------------------------------------------------------------------------------------------
// REEXPORTS
// -----------------------------------------------------------------------------------------------

pub use gnss::{GnssFix, GnssReceiver};
pub use gyro::{ImuError, RateGyro};
pub use motor::{MotorDems, MotorDriver, MotorError, WheelDem, WheelDir};
pub use range::{RangeError, RangeFinder};
pub use servo::{PanServo, ServoError};
