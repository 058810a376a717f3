//! # Drive Control module
//!
//! The only writer of the motor outputs. Converts motion intents (forward, pivot, arc, ...) into
//! left/right wheel demands for the differential drive and writes them to the motor driver
//! straight away.
//!
//! Pivots started with `pivot_left`/`pivot_right` are bounded: they store a deadline and are
//! stopped by `check_pivot_timeout`, which must be called every cycle. Any other motion cancels a
//! running pivot.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::DriveCtrlParams;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Direction of travel of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Forward,
    Backward,
}
