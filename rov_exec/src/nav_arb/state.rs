//! Implementations for the NavArb state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use embedded_hal::blocking::delay::DelayMs;
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{ArbEvent, ArbParams, NavArbError, NavArbParams, NavMode, NavPhase};
use crate::{
    drive_ctrl::DriveCtrl, 
    head_est::HeadEst, 
    obs_scan::ObsScan, 
    pos_track::PosTrack, 
    turn_ctrl::TurnCtrl
};
use comms_if::{
    cmd::StatusSnapshot,
    eqpt::{GnssReceiver, MotorDems, MotorDriver, PanServo, RangeFinder, RateGyro},
};
use util::{geo::GeoPoint, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The equipment handed over to the arbiter at startup.
pub struct Equipment<G, P, R, S, M, D> {
    pub gyro: G,
    pub gnss: P,
    pub range: R,
    pub servo: S,
    pub motors: M,
    pub delay: D,
}

/// Navigation arbiter state.
pub struct NavArb<G, P, R, S, M, D> {
    pub(super) params: NavArbParams,

    pub(super) head_est: HeadEst<G, D>,
    pub(super) pos_track: PosTrack<P>,
    pub(super) obs_scan: ObsScan<R, S, D>,
    pub(super) drive_ctrl: DriveCtrl<M>,
    pub(super) turn_ctrl: TurnCtrl,

    pub(super) mode: NavMode,
    pub(super) phase: NavPhase,

    /// Destination, only ever replaced by a new one.
    pub(super) waypoint: Option<GeoPoint>,

    /// Session time at which the current navigation started.
    pub(super) nav_start_time_s: Option<f64>,

    /// Obstacle state seen on the previous cycle, for edge detection.
    pub(super) prev_blocked: bool,

    /// True while gyro reads are failing, so the failure is only logged once.
    pub(super) heading_read_failing: bool,

    /// Events raised during the current cycle.
    pub(super) events: Vec<ArbEvent>,
}

/// Status report of one arbiter cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavArbStatusReport {
    pub mode: NavMode,
    pub phase: NavPhase,
    pub blocked: bool,
    pub heading_healthy: bool,

    /// Units: degrees
    pub heading_deg: f64,

    /// Distance to the waypoint, if there is both a waypoint and a position.
    ///
    /// Units: meters
    pub distance_to_waypoint_m: Option<f64>,

    pub events: Vec<ArbEvent>,
}

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
    pub fn new(params: ArbParams, eqpt: Equipment<G, P, R, S, M, D>) -> Self {
        Self {
            params: params.nav_arb,
            head_est: HeadEst::new(params.head_est, eqpt.gyro, eqpt.delay.clone()),
            pos_track: PosTrack::new(eqpt.gnss),
            obs_scan: ObsScan::new(params.obs_scan, eqpt.range, eqpt.servo, eqpt.delay),
            drive_ctrl: DriveCtrl::new(params.drive_ctrl, eqpt.motors),
            turn_ctrl: TurnCtrl::new(params.turn_ctrl),
            mode: NavMode::Idle,
            phase: NavPhase::Assess,
            waypoint: None,
            nav_start_time_s: None,
            prev_blocked: false,
            heading_read_failing: false,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn is_navigating(&self) -> bool {
        self.mode == NavMode::AutonomousNav
    }

    pub fn waypoint(&self) -> Option<GeoPoint> {
        self.waypoint
    }

    pub fn motor_dems(&self) -> MotorDems {
        *self.drive_ctrl.dems()
    }

    /// Flat snapshot for the `status` verb.
    pub fn status(&self) -> StatusSnapshot {
        let position = self.pos_track.position();
        let healthy = self.head_est.is_healthy();

        StatusSnapshot {
            distance_cm: self.obs_scan.last_distance_cm(),
            obstacle: self.obs_scan.is_blocked(),
            gps_valid: position.is_some(),
            latitude: position.map(|p| p.lat_deg),
            longitude: position.map(|p| p.lng_deg),
            gyro_ok: healthy,
            heading_deg: match healthy {
                true => Some(self.head_est.heading_deg()),
                false => None
            },
            navigating: self.is_navigating(),
            mode: self.mode.to_string(),
        }
    }

    /// Leave autonomous navigation, stopping the motors, and record why.
    pub(super) fn end_nav(&mut self, event: Option<ArbEvent>) {
        self.drive_ctrl.stop();

        if let Some(e) = event {
            info!("Navigation ended: {}", e);
            self.events.push(e);
        }

        self.set_mode(NavMode::Idle);
        self.phase = NavPhase::Assess;
        self.nav_start_time_s = None;
    }

    pub(super) fn set_mode(&mut self, mode: NavMode) {
        if mode != self.mode {
            info!("NavArb mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Track obstacle transitions, raising an event on each edge.
    fn update_obstacle(&mut self, time_s: f64) {
        self.obs_scan.update(time_s);

        let blocked = self.obs_scan.is_blocked();

        if blocked != self.prev_blocked {
            let event = match blocked {
                true => ArbEvent::ObstacleDetected { 
                    distance_cm: self.obs_scan.last_distance_cm() 
                },
                false => ArbEvent::PathClear
            };

            match blocked {
                true => warn!("{}", event),
                false => info!("{}", event)
            }

            self.events.push(event);
            self.prev_blocked = blocked;
        }
    }

    fn update_heading(&mut self, time_s: f64) {
        match self.head_est.update(time_s) {
            Ok(_) => {
                if self.heading_read_failing {
                    info!("Gyro reads recovered");
                    self.heading_read_failing = false;
                }
            },
            Err(e) => {
                if !self.heading_read_failing {
                    warn!("Heading not updated: {}", e);
                    self.heading_read_failing = true;
                }
            }
        }
    }

    /// Stop a manual motion which is heading into an obstacle.
    ///
    /// Bounded pivots are allowed to finish, navigation is never interrupted.
    fn safety_stop(&mut self) {
        if !self.obs_scan.is_blocked()
            || self.drive_ctrl.is_pivoting()
            || self.is_navigating()
            || !self.drive_ctrl.is_moving()
        {
            return
        }

        warn!("Safety stop, obstacle at {:.1} cm", self.obs_scan.last_distance_cm());
        self.drive_ctrl.stop();
        self.set_mode(NavMode::Idle);
        self.events.push(ArbEvent::SafetyStop);
    }

    #[cfg(test)]
    pub(crate) fn head_est_mut(&mut self) -> &mut HeadEst<G, D> {
        &mut self.head_est
    }
}

impl<G, P, R, S, M, D> State for NavArb<G, P, R, S, M, D>
where
    G: RateGyro,
    P: GnssReceiver,
    R: RangeFinder,
    S: PanServo,
    M: MotorDriver,
    D: DelayMs<u32> + Clone,
{
    type InitData = ();
    type InitError = NavArbError;

    type InputData = f64;
    type OutputData = MotorDems;
    type StatusReport = NavArbStatusReport;
    type ProcError = std::convert::Infallible;

    /// Stop the motors, center the scan head and bring the gyro up.
    ///
    /// A gyro failure is returned but leaves the arbiter usable, navigation then drives forward
    /// only. The error is only fatal for the scan head.
    fn init(&mut self, _init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.drive_ctrl.stop();

        self.obs_scan.init(()).map_err(NavArbError::ScanHeadInit)?;

        self.head_est.init(()).map_err(NavArbError::HeadingUnavailable)
    }

    /// Run one control cycle at the given session time.
    fn proc(&mut self, time_s: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let time_s = *time_s;
        self.events.clear();

        // Bounded pivots end first so that nothing below sees a stale motion
        self.drive_ctrl.check_pivot_timeout(time_s);

        // Sensors
        self.update_obstacle(time_s);
        self.pos_track.update(time_s);
        self.update_heading(time_s);

        // Safety gate
        self.safety_stop();

        // Navigation
        if self.is_navigating() {
            self.navigate(time_s);
        }

        if self.mode == NavMode::ManualAvoidance && !self.drive_ctrl.is_moving() {
            self.set_mode(NavMode::Idle);
        }

        let distance_to_waypoint_m = match (self.pos_track.position(), self.waypoint) {
            (Some(p), Some(w)) => Some(p.distance_to(&w)),
            _ => None
        };

        Ok((
            *self.drive_ctrl.dems(),
            NavArbStatusReport {
                mode: self.mode,
                phase: self.phase,
                blocked: self.obs_scan.is_blocked(),
                heading_healthy: self.head_est.is_healthy(),
                heading_deg: self.head_est.heading_deg(),
                distance_to_waypoint_m,
                events: std::mem::take(&mut self.events),
            }
        ))
    }
}
