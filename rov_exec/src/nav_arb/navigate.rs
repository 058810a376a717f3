//! Autonomous navigation towards the waypoint

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use embedded_hal::blocking::delay::DelayMs;
use log::{debug, warn};

use super::{ArbEvent, NavArb, NavPhase};
use comms_if::eqpt::{GnssReceiver, MotorDriver, PanServo, RangeFinder, RateGyro};
use util::{
    maths::{clamp, lin_map, norm_angle_delta_deg},
    time::seconds_to_millis,
};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<G, P, R, S, M, D> NavArb<G, P, R, S, M, D>
where
    G: RateGyro,
    P: GnssReceiver,
    R: RangeFinder,
    S: PanServo,
    M: MotorDriver,
    D: DelayMs<u32> + Clone,
{
    /// One navigation step, called every cycle while in `AutonomousNav`.
    pub(super) fn navigate(&mut self, time_s: f64) {
        if let Some(start_s) = self.nav_start_time_s {
            if time_s - start_s > self.params.max_nav_duration_s {
                warn!(
                    "Waypoint not reached after {:.0} s, giving up", 
                    self.params.max_nav_duration_s
                );
                self.end_nav(Some(ArbEvent::NavTimeout));
                return
            }
        }

        match self.phase {
            NavPhase::Turning { until_s } => {
                if time_s >= until_s {
                    self.drive_ctrl.stop();
                    self.phase = NavPhase::Settling { 
                        until_s: time_s + self.params.settle_duration_s 
                    };
                }
            },
            NavPhase::Settling { until_s } => {
                if time_s >= until_s {
                    self.phase = NavPhase::Assess;
                    self.assess(time_s);
                }
            },
            NavPhase::Assess => self.assess(time_s)
        }
    }

    /// Duration of a corrective pivot for the given heading error.
    ///
    /// Units: seconds
    pub(super) fn turn_duration_s(&self, error_deg: f64) -> f64 {
        let p = &self.params;

        let duration_s = lin_map(
            (p.turn_error_min_deg, p.turn_error_max_deg),
            (p.min_turn_duration_s, p.max_turn_duration_s),
            error_deg.abs()
        );

        clamp(duration_s, p.min_turn_duration_s, p.max_turn_duration_s)
    }

    fn assess(&mut self, time_s: f64) {
        let waypoint = match self.waypoint {
            Some(w) => w,
            None => {
                self.end_nav(Some(ArbEvent::NoWaypoint));
                return
            }
        };

        let position = match self.pos_track.position() {
            Some(p) if self.pos_track.is_fresh(time_s, self.params.max_fix_age_s) => p,
            _ => {
                let fix_age_s = self.pos_track.fix_age_s(time_s);
                self.end_nav(Some(ArbEvent::PositionLost { fix_age_s }));
                return
            }
        };

        let distance_m = position.distance_to(&waypoint);
        let bearing_deg = position.bearing_to(&waypoint);

        if distance_m <= self.params.arrival_distance_m {
            self.end_nav(Some(ArbEvent::Arrived { distance_m }));
            return
        }

        if self.head_est.is_healthy() {
            let heading_deg = self.head_est.heading_deg();
            let error_deg = norm_angle_delta_deg(bearing_deg - heading_deg);

            debug!(
                "Nav: distance {:.1} m, bearing {:.1} deg, heading {:.1} deg, error {:.1} deg",
                distance_m, bearing_deg, heading_deg, error_deg
            );

            if error_deg.abs() > self.params.heading_tolerance_deg {
                let speed = self.turn_ctrl.speed_for_angle_error(error_deg);
                let duration_s = self.turn_duration_s(error_deg);

                // Headings grow clockwise, so a positive error is to the right
                if error_deg > 0.0 {
                    self.drive_ctrl.turn_right(speed);
                }
                else {
                    self.drive_ctrl.turn_left(speed);
                }

                debug!(
                    "Nav: turning {} at {} for {} ms",
                    if error_deg > 0.0 { "right" } else { "left" },
                    speed,
                    seconds_to_millis(duration_s)
                );

                self.phase = NavPhase::Turning { until_s: time_s + duration_s };
                return
            }
        }
        else {
            debug!(
                "Nav: distance {:.1} m, bearing {:.1} deg, no heading",
                distance_m, bearing_deg
            );
        }

        self.drive_ctrl.forward();
    }
}
