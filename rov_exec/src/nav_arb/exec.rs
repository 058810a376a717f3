//! Command dispatch and the safety gate for manual commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use embedded_hal::blocking::delay::DelayMs;
use log::{info, warn};

use super::{NavArb, NavMode, NavPhase};
use crate::drive_ctrl::Travel;
use comms_if::{
    cmd::{Cmd, ManualCmd, NavCmd, Response},
    eqpt::{GnssReceiver, MotorDriver, PanServo, RangeFinder, RateGyro},
};
use util::geo::GeoPoint;

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
    /// Execute a command received at the given session time.
    pub fn exec_cmd(&mut self, cmd: &Cmd, time_s: f64) -> Response {
        info!("Executing {:?}", cmd);

        let response = match cmd {
            Cmd::Stop => self.exec_stop(),
            Cmd::Manual(m) => self.exec_manual(*m, time_s),
            Cmd::Nav(n) => self.exec_nav(n, time_s),
        };

        match response {
            Response::Blocked(ref msg) => warn!("Command blocked: {}", msg),
            Response::Rejected(ref msg) => warn!("Command rejected: {}", msg),
            _ => ()
        }

        response
    }

    fn exec_stop(&mut self) -> Response {
        if self.is_navigating() {
            self.end_nav(None);
            Response::Done("navigation stopped".into())
        }
        else {
            self.drive_ctrl.stop();
            self.set_mode(NavMode::Idle);
            Response::Ok
        }
    }

    fn exec_manual(&mut self, cmd: ManualCmd, time_s: f64) -> Response {
        match cmd {
            ManualCmd::Info => return Response::Done(self.info_line()),
            ManualCmd::Sweep => return self.exec_sweep(),
            _ => ()
        }

        if self.is_navigating() {
            return Response::Blocked(format!("{} refused, navigation active", cmd))
        }

        if cmd.is_forward() && self.obs_scan.is_blocked() {
            return Response::Blocked(format!(
                "{} refused, obstacle ahead ({:.1} cm)", 
                cmd, 
                self.obs_scan.last_distance_cm()
            ))
        }

        if let Some(side) = cmd.lateral_side() {
            let threshold_cm = self.obs_scan.obstacle_threshold_cm();
            let clear = self.obs_scan.check_side_clear(side, threshold_cm);

            if let Err(e) = self.obs_scan.return_to_center() {
                warn!("Could not re-center the scan head: {}", e);
            }

            if !clear {
                return Response::Blocked(format!("{} refused, {} side not clear", cmd, side))
            }
        }

        match cmd {
            ManualCmd::Forward => self.drive_ctrl.forward(),
            ManualCmd::Backward => self.drive_ctrl.backward(),
            ManualCmd::Left => self.drive_ctrl.pivot_left(time_s),
            ManualCmd::Right => self.drive_ctrl.pivot_right(time_s),
            ManualCmd::ForwardLeft => self.drive_ctrl.arc_left(Travel::Forward),
            ManualCmd::ForwardRight => self.drive_ctrl.arc_right(Travel::Forward),
            ManualCmd::BackwardLeft => self.drive_ctrl.arc_left(Travel::Backward),
            ManualCmd::BackwardRight => self.drive_ctrl.arc_right(Travel::Backward),
            // Handled above
            ManualCmd::Info | ManualCmd::Sweep => (),
        }

        self.set_mode(NavMode::ManualAvoidance);

        Response::Ok
    }

    fn exec_sweep(&mut self) -> Response {
        if self.is_navigating() {
            return Response::Blocked("sweep refused, navigation active".into())
        }

        match self.obs_scan.full_sweep() {
            Ok(readings) => Response::Text(
                readings
                    .into_iter()
                    .map(|(a, d)| format!("{:>3} deg: {:.1} cm", a, d))
                    .collect()
            ),
            Err(e) => Response::Rejected(format!("sweep failed: {}", e))
        }
    }

    fn exec_nav(&mut self, cmd: &NavCmd, time_s: f64) -> Response {
        match cmd {
            NavCmd::Set { coords } => self.exec_set(&coords.concat()),
            NavCmd::Go => self.exec_go(time_s),
            NavCmd::Status => Response::Status(self.status()),
            NavCmd::Calibrate => {
                if let Some(r) = self.check_stationary("calibrate") {
                    return r
                }
                match self.head_est.calibrate() {
                    Ok(()) => Response::Done(format!(
                        "gyro calibrated, bias {:.3} deg/s", 
                        self.head_est.bias_dps()
                    )),
                    Err(e) => Response::Rejected(e.to_string())
                }
            },
            NavCmd::GyroTest => Response::Text(
                self.head_est.sample_raw()
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| match s {
                        Ok(r) => format!("sample {}: {:.2} deg/s", i + 1, r),
                        Err(e) => format!("sample {}: {}", i + 1, e)
                    })
                    .collect()
            ),
            NavCmd::GyroDebug => Response::Text(self.head_est.debug_lines()),
            NavCmd::GyroReset => {
                if let Some(r) = self.check_stationary("mpu_reset") {
                    return r
                }
                match self.head_est.reset() {
                    Ok(()) => Response::Done("gyro reset and calibrated".into()),
                    Err(e) => Response::Rejected(e.to_string())
                }
            },
            NavCmd::SpeedTest => Response::Text(self.turn_ctrl.speed_table()),
        }
    }

    fn exec_set(&mut self, text: &str) -> Response {
        let waypoint = match GeoPoint::from_dms_pair(text) {
            Some(w) => w,
            None => return Response::Rejected(format!("invalid coordinates: {}", text))
        };

        self.waypoint = Some(waypoint);

        // Retarget a running navigation
        if self.is_navigating() {
            self.drive_ctrl.stop();
            self.phase = NavPhase::Assess;
        }

        info!("Waypoint set to {:.6}, {:.6}", waypoint.lat_deg, waypoint.lng_deg);

        match self.pos_track.position() {
            Some(p) => Response::Done(format!(
                "waypoint {:.6}, {:.6}, distance {:.1} m, bearing {:.1} deg",
                waypoint.lat_deg,
                waypoint.lng_deg,
                p.distance_to(&waypoint),
                p.bearing_to(&waypoint)
            )),
            None => Response::Done(format!(
                "waypoint {:.6}, {:.6}, no position fix yet",
                waypoint.lat_deg,
                waypoint.lng_deg
            ))
        }
    }

    fn exec_go(&mut self, time_s: f64) -> Response {
        if self.waypoint.is_none() {
            return Response::Rejected("no waypoint set".into())
        }

        if !self.pos_track.is_fresh(time_s, self.params.max_fix_age_s) {
            return Response::Rejected("no valid position fix".into())
        }

        self.drive_ctrl.stop();
        self.set_mode(NavMode::AutonomousNav);
        self.phase = NavPhase::Assess;
        self.nav_start_time_s = Some(time_s);

        if self.head_est.is_healthy() {
            Response::Done("navigation started".into())
        }
        else {
            warn!("Navigating without a heading, forward only");
            Response::Done("navigation started without heading, forward only".into())
        }
    }

    /// Refuse a command which needs the rover to be still, `None` if it is.
    fn check_stationary(&self, verb: &str) -> Option<Response> {
        if self.is_navigating() || self.drive_ctrl.is_moving() {
            Some(Response::Rejected(format!("{} needs the rover to be stationary", verb)))
        }
        else {
            None
        }
    }

    fn info_line(&self) -> String {
        let distance = format!("distance {:.1} cm", self.obs_scan.last_distance_cm());

        match self.pos_track.position() {
            Some(p) => format!("{}, position {:.6}, {:.6}", distance, p.lat_deg, p.lng_deg),
            None => distance
        }
    }
}
