//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};

// Internal
use super::{DriveCtrlParams, Travel};
use comms_if::eqpt::{MotorDems, MotorDriver, MotorError, WheelDem};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control state.
pub struct DriveCtrl<M> {
    params: DriveCtrlParams,

    motors: M,

    /// Demands last written (or attempted) to the motors.
    dems: MotorDems,

    /// Session time at which the running bounded pivot ends.
    pivot_until_s: Option<f64>,

    /// Error from the last write, cleared by the next successful one.
    output_error: Option<MotorError>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: MotorDriver> DriveCtrl<M> {
    pub fn new(params: DriveCtrlParams, motors: M) -> Self {
        Self {
            params,
            motors,
            dems: MotorDems::stopped(),
            pivot_until_s: None,
            output_error: None,
        }
    }

    pub fn forward(&mut self) {
        let s = self.params.normal_speed;
        self.drive(WheelDem::forward(s), WheelDem::forward(s));
    }

    pub fn backward(&mut self) {
        let s = self.params.normal_speed;
        self.drive(WheelDem::backward(s), WheelDem::backward(s));
    }

    /// Pivot left on the spot for the configured pivot duration.
    pub fn pivot_left(&mut self, time_s: f64) {
        let s = self.params.pivot_speed;
        self.drive(WheelDem::backward(s), WheelDem::forward(s));
        self.pivot_until_s = Some(time_s + self.params.pivot_duration_s);
    }

    /// Pivot right on the spot for the configured pivot duration.
    pub fn pivot_right(&mut self, time_s: f64) {
        let s = self.params.pivot_speed;
        self.drive(WheelDem::forward(s), WheelDem::backward(s));
        self.pivot_until_s = Some(time_s + self.params.pivot_duration_s);
    }

    /// Curve to the left, the left wheel running slower than the right.
    pub fn arc_left(&mut self, travel: Travel) {
        let (inner, outer) = self.arc_wheels(travel);
        self.drive(inner, outer);
    }

    /// Curve to the right, the right wheel running slower than the left.
    pub fn arc_right(&mut self, travel: Travel) {
        let (inner, outer) = self.arc_wheels(travel);
        self.drive(outer, inner);
    }

    /// Pivot left at the given duty until told otherwise.
    pub fn turn_left(&mut self, speed: u8) {
        self.drive(WheelDem::backward(speed), WheelDem::forward(speed));
    }

    /// Pivot right at the given duty until told otherwise.
    pub fn turn_right(&mut self, speed: u8) {
        self.drive(WheelDem::forward(speed), WheelDem::backward(speed));
    }

    /// Stop both wheels and disable the driver. Safe to call at any time.
    pub fn stop(&mut self) {
        self.pivot_until_s = None;
        self.dems = MotorDems::stopped();
        self.apply();
    }

    /// Stop a bounded pivot whose deadline has passed. Returns true if it stopped one.
    pub fn check_pivot_timeout(&mut self, time_s: f64) -> bool {
        match self.pivot_until_s {
            Some(t) if time_s >= t => {
                debug!("Pivot complete");
                self.stop();
                true
            },
            _ => false
        }
    }

    pub fn is_pivoting(&self) -> bool {
        self.pivot_until_s.is_some()
    }

    pub fn is_moving(&self) -> bool {
        self.dems.is_moving()
    }

    pub fn dems(&self) -> &MotorDems {
        &self.dems
    }

    pub fn output_error(&self) -> Option<&MotorError> {
        self.output_error.as_ref()
    }

    fn arc_wheels(&self, travel: Travel) -> (WheelDem, WheelDem) {
        let inner = self.params.curve_speed;
        let outer = self.params.normal_speed;

        match travel {
            Travel::Forward => (WheelDem::forward(inner), WheelDem::forward(outer)),
            Travel::Backward => (WheelDem::backward(inner), WheelDem::backward(outer)),
        }
    }

    /// Set a new continuous motion, cancelling any bounded pivot.
    fn drive(&mut self, left: WheelDem, right: WheelDem) {
        self.pivot_until_s = None;
        self.dems = MotorDems::drive(left, right);
        self.apply();
    }

    fn apply(&mut self) {
        trace!("Motor demands: {:?}", self.dems);

        match self.motors.set_outputs(&self.dems) {
            Ok(()) => self.output_error = None,
            Err(e) => {
                if self.output_error.is_none() {
                    warn!("Could not write the motor demands: {}", e);
                }
                self.output_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fakes::FakeMotors;
    use comms_if::eqpt::WheelDir;

    fn drive_ctrl() -> (DriveCtrl<FakeMotors>, FakeMotors) {
        let motors = FakeMotors::default();
        (DriveCtrl::new(DriveCtrlParams::default(), motors.clone()), motors)
    }

    #[test]
    fn test_forward_backward() {
        let (mut dc, motors) = drive_ctrl();

        dc.forward();
        assert!(dc.is_moving());
        assert_eq!(
            motors.last(),
            Some(MotorDems::drive(WheelDem::forward(200), WheelDem::forward(200)))
        );

        dc.backward();
        assert_eq!(dc.dems().left, WheelDem::backward(200));
        assert_eq!(dc.dems().right, WheelDem::backward(200));
    }

    #[test]
    fn test_pivot_directions() {
        let (mut dc, _) = drive_ctrl();

        dc.pivot_right(0.0);
        assert_eq!(dc.dems().left.dir, WheelDir::Forward);
        assert_eq!(dc.dems().right.dir, WheelDir::Backward);
        assert_eq!(dc.dems().left.duty, 220);

        // Continuous turns spin the same way as the bounded pivots
        dc.turn_right(104);
        assert_eq!(dc.dems().left, WheelDem::forward(104));
        assert_eq!(dc.dems().right, WheelDem::backward(104));

        dc.pivot_left(0.0);
        assert_eq!(dc.dems().left.dir, WheelDir::Backward);
        assert_eq!(dc.dems().right.dir, WheelDir::Forward);

        dc.turn_left(150);
        assert_eq!(dc.dems().left, WheelDem::backward(150));
        assert_eq!(dc.dems().right, WheelDem::forward(150));
    }

    #[test]
    fn test_pivot_timeout() {
        let (mut dc, _) = drive_ctrl();

        dc.pivot_left(10.0);
        assert!(dc.is_pivoting());

        assert!(!dc.check_pivot_timeout(10.1));
        assert!(dc.is_moving());

        assert!(dc.check_pivot_timeout(10.25));
        assert!(!dc.is_pivoting());
        assert!(!dc.is_moving());

        // Only once
        assert!(!dc.check_pivot_timeout(11.0));
    }

    #[test]
    fn test_motion_cancels_pivot() {
        let (mut dc, _) = drive_ctrl();

        dc.pivot_right(0.0);
        dc.forward();
        assert!(!dc.is_pivoting());
        assert!(!dc.check_pivot_timeout(1.0));
        assert!(dc.is_moving());
    }

    #[test]
    fn test_arcs() {
        let (mut dc, _) = drive_ctrl();

        dc.arc_left(Travel::Forward);
        assert_eq!(dc.dems().left, WheelDem::forward(140));
        assert_eq!(dc.dems().right, WheelDem::forward(200));

        dc.arc_right(Travel::Forward);
        assert_eq!(dc.dems().left, WheelDem::forward(200));
        assert_eq!(dc.dems().right, WheelDem::forward(140));

        dc.arc_left(Travel::Backward);
        assert_eq!(dc.dems().left, WheelDem::backward(140));
        assert_eq!(dc.dems().right, WheelDem::backward(200));

        dc.arc_right(Travel::Backward);
        assert_eq!(dc.dems().left, WheelDem::backward(200));
        assert_eq!(dc.dems().right, WheelDem::backward(140));
    }

    #[test]
    fn test_stop_idempotent() {
        let (mut dc, motors) = drive_ctrl();

        dc.stop();
        dc.stop();
        assert!(!dc.is_moving());
        assert_eq!(motors.last(), Some(MotorDems::stopped()));
        assert_eq!(motors.history.borrow().len(), 2);
    }

    #[test]
    fn test_output_error_recorded() {
        let (mut dc, motors) = drive_ctrl();

        motors.fail.set(true);
        dc.forward();
        assert!(dc.output_error().is_some());

        // The intent is kept so that the arbiter still sees the rover as moving
        assert!(dc.is_moving());

        motors.fail.set(false);
        dc.stop();
        assert!(dc.output_error().is_none());
    }
}
