//! # Position Tracker module
//!
//! Keeps the most recent locked satellite fix. Once the first locked fix has arrived the position
//! stays valid for the rest of the session, the fix time is kept so that users can judge how
//! stale it is.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, trace};
use serde::Serialize;

use comms_if::eqpt::GnssReceiver;
use util::geo::GeoPoint;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of fix events consumed in one update, so a chatty receiver cannot hold the
/// loop.
const MAX_FIXES_PER_UPDATE: usize = 32;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The rover's position estimate.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Pose {
    pub position: GeoPoint,

    /// False until the first locked fix, true forever after.
    pub valid: bool,

    /// Session time at which the last locked fix was received.
    pub last_fix_time_s: Option<f64>,
}

pub struct PosTrack<P> {
    gnss: P,
    pose: Pose,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<P: GnssReceiver> PosTrack<P> {
    pub fn new(gnss: P) -> Self {
        Self {
            gnss,
            pose: Pose::default(),
        }
    }

    /// Consume the fix events decoded since the last call.
    ///
    /// Returns the number of locked fixes applied.
    pub fn update(&mut self, time_s: f64) -> usize {
        let mut num_applied = 0;

        for _ in 0..MAX_FIXES_PER_UPDATE {
            let fix = match self.gnss.poll_fix() {
                Some(f) => f,
                None => break
            };

            if !fix.locked {
                trace!("Ignoring unlocked fix");
                continue
            }

            if !self.pose.valid {
                info!(
                    "First position fix: {:.6}, {:.6}", 
                    fix.latitude_deg, fix.longitude_deg
                );
            }

            self.pose = Pose {
                position: GeoPoint::new(fix.latitude_deg, fix.longitude_deg),
                valid: true,
                last_fix_time_s: Some(time_s),
            };
            num_applied += 1;
        }

        num_applied
    }

    pub fn is_valid(&self) -> bool {
        self.pose.valid
    }

    /// Current position, if a fix has ever been received.
    pub fn position(&self) -> Option<GeoPoint> {
        match self.pose.valid {
            true => Some(self.pose.position),
            false => None
        }
    }

    /// Age of the last locked fix at `time_s`.
    pub fn fix_age_s(&self, time_s: f64) -> Option<f64> {
        self.pose.last_fix_time_s.map(|t| time_s - t)
    }

    /// True if there is a fix no older than `max_age_s`.
    pub fn is_fresh(&self, time_s: f64, max_age_s: f64) -> bool {
        match self.fix_age_s(time_s) {
            Some(age) => age <= max_age_s,
            None => false
        }
    }
}
