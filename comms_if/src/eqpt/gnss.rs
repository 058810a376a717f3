//! # Satellite positioning receiver interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A receiver which has already decoded the satellite sentences into fixes.
pub trait GnssReceiver {
    /// Return the next decoded fix event, or `None` if nothing new has been decoded since the last
    /// call.
    fn poll_fix(&mut self) -> Option<GnssFix>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single decoded fix event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssFix {
    /// Units: degrees, positive north
    pub latitude_deg: f64,

    /// Units: degrees, positive east
    pub longitude_deg: f64,

    /// True if the receiver has a position lock. Coordinates of an unlocked fix are meaningless.
    pub locked: bool,
}
