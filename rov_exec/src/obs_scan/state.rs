//! Implementations for the ObsScan state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use embedded_hal::blocking::delay::DelayMs;
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{ObsScanError, ObsScanParams};
use comms_if::{
    cmd::Side,
    eqpt::{PanServo, RangeError, RangeFinder},
};
use util::{maths::clamp, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Obstacle scanner state.
pub struct ObsScan<R, S, D> {
    params: ObsScanParams,

    range: R,

    servo: S,

    delay: D,

    /// Angle last commanded to the servo.
    ///
    /// Units: degrees
    head_angle_deg: i32,

    /// Most recent valid straight-ahead distance, the invalid distance until there has been one.
    ///
    /// Units: centimeters
    last_distance_cm: f64,

    /// Session time of the last periodic measurement.
    last_meas_time_s: Option<f64>,

    /// Number of periodic pings in a row which received no echo.
    num_consec_timeouts: u32,
}

/// Snapshot of what is known about the space in front of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleState {
    /// Units: centimeters
    pub last_distance_cm: f64,

    pub blocked: bool,

    pub sensor_available: bool,

    pub last_meas_time_s: Option<f64>,
}

/// Status report of one scanner cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObsScanStatusReport {
    /// True if a periodic measurement was made this cycle.
    pub measured: bool,

    /// The reading of that measurement, `None` if there was no valid echo.
    pub reading_cm: Option<f64>,
}

/// Outcome of a single ping.
enum Ping {
    Valid(f64),
    OutOfRange,
    NoEcho,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<R, S, D> ObsScan<R, S, D>
where
    R: RangeFinder,
    S: PanServo,
    D: DelayMs<u32>
{
    pub fn new(params: ObsScanParams, range: R, servo: S, delay: D) -> Self {
        let head_angle_deg = params.servo_center_deg;
        let last_distance_cm = params.invalid_distance_cm;

        Self {
            params,
            range,
            servo,
            delay,
            head_angle_deg,
            last_distance_cm,
            last_meas_time_s: None,
            num_consec_timeouts: 0,
        }
    }

    /// One ping in whatever direction the head currently points.
    ///
    /// Returns the invalid distance if there was no echo or the echo was out of range.
    pub fn measure(&mut self) -> f64 {
        self.measure_valid()
            .unwrap_or(self.params.invalid_distance_cm)
    }

    /// Point the head at `angle_deg` (clamped to the servo's range), wait for it to settle, then
    /// measure once.
    pub fn scan_direction(&mut self, angle_deg: i32) -> Result<f64, ObsScanError> {
        let angle_deg = clamp(
            angle_deg, 
            self.params.servo_min_deg, 
            self.params.servo_max_deg
        );

        self.move_head(angle_deg)?;

        let distance_cm = self.measure();
        debug!("Scan at {} deg: {:.1} cm", angle_deg, distance_cm);

        Ok(distance_cm)
    }

    /// Scan the left extreme, true if the distance there is greater than `threshold_cm`.
    ///
    /// The head is left pointing left, callers must re-center it.
    pub fn check_left_clear(&mut self, threshold_cm: f64) -> bool {
        self.check_side_clear(Side::Left, threshold_cm)
    }

    /// Scan the right extreme, true if the distance there is greater than `threshold_cm`.
    ///
    /// The head is left pointing right, callers must re-center it.
    pub fn check_right_clear(&mut self, threshold_cm: f64) -> bool {
        self.check_side_clear(Side::Right, threshold_cm)
    }

    /// Scan the given side. Not clear if the sensor is unavailable or the head cannot be moved.
    pub fn check_side_clear(&mut self, side: Side, threshold_cm: f64) -> bool {
        if !self.sensor_available() {
            warn!("Rangefinder unavailable, {} side not clear", side);
            return false
        }

        let angle_deg = match side {
            Side::Left => self.params.servo_left_deg,
            Side::Right => self.params.servo_right_deg,
        };

        match self.scan_direction(angle_deg) {
            Ok(d) => {
                let clear = d > threshold_cm;
                info!(
                    "{} side {} ({:.1} cm)", 
                    side, 
                    if clear { "clear" } else { "blocked" }, 
                    d
                );
                clear
            },
            Err(e) => {
                warn!("Could not scan the {} side: {}", side, e);
                false
            }
        }
    }

    /// Point the head straight ahead, waiting for it to settle if it had to move.
    pub fn return_to_center(&mut self) -> Result<(), ObsScanError> {
        if self.head_angle_deg != self.params.servo_center_deg {
            self.move_head(self.params.servo_center_deg)?;
        }

        Ok(())
    }

    /// Scan from the right extreme to the left extreme in fixed steps, then re-center.
    ///
    /// Returns the `(angle, distance)` pairs measured.
    pub fn full_sweep(&mut self) -> Result<Vec<(i32, f64)>, ObsScanError> {
        let mut readings = Vec::new();
        let step = self.params.sweep_step_deg.max(1);
        let mut angle_deg = self.params.servo_right_deg;

        while angle_deg <= self.params.servo_left_deg {
            let d = match self.scan_direction(angle_deg) {
                Ok(d) => d,
                Err(e) => {
                    // Best effort to leave the head centred
                    self.return_to_center().ok();
                    return Err(e)
                }
            };
            readings.push((angle_deg, d));
            self.delay.delay_ms(self.params.sweep_pause_ms);
            angle_deg += step;
        }

        self.return_to_center()?;

        Ok(readings)
    }

    /// True if the rover must not drive forward: the last valid distance is within the
    /// threshold, or the sensor is unavailable.
    pub fn is_blocked(&self) -> bool {
        !self.sensor_available()
            || (self.last_distance_cm <= self.params.obstacle_threshold_cm 
                && self.last_distance_cm > 0.0)
    }

    /// False once too many periodic pings in a row have gone unanswered.
    pub fn sensor_available(&self) -> bool {
        self.params.max_consec_timeouts == 0
            || self.num_consec_timeouts < self.params.max_consec_timeouts
    }

    pub fn last_distance_cm(&self) -> f64 {
        self.last_distance_cm
    }

    pub fn head_angle_deg(&self) -> i32 {
        self.head_angle_deg
    }

    pub fn obstacle_threshold_cm(&self) -> f64 {
        self.params.obstacle_threshold_cm
    }

    pub fn obstacle_state(&self) -> ObstacleState {
        ObstacleState {
            last_distance_cm: self.last_distance_cm,
            blocked: self.is_blocked(),
            sensor_available: self.sensor_available(),
            last_meas_time_s: self.last_meas_time_s,
        }
    }

    /// Make the periodic measurement if one is due at `time_s`.
    pub fn update(&mut self, time_s: f64) -> ObsScanStatusReport {
        if let Some(t) = self.last_meas_time_s {
            if time_s - t < self.params.measure_period_s {
                return ObsScanStatusReport::default()
            }
        }

        let ping = self.ping();
        let was_available = self.sensor_available();

        let reading = match ping {
            Ping::Valid(d) => {
                self.last_distance_cm = d;
                self.num_consec_timeouts = 0;
                Some(d)
            },
            // An echo from beyond the valid range still proves the sensor works
            Ping::OutOfRange => {
                self.num_consec_timeouts = 0;
                None
            },
            Ping::NoEcho => {
                self.num_consec_timeouts = self.num_consec_timeouts.saturating_add(1);
                None
            }
        };

        self.last_meas_time_s = Some(time_s);

        match (was_available, self.sensor_available()) {
            (true, false) => warn!(
                "Rangefinder unavailable after {} pings without an echo", 
                self.num_consec_timeouts
            ),
            (false, true) => info!("Rangefinder available again"),
            _ => ()
        }

        trace!("ObsScan periodic reading: {:?}", reading);

        ObsScanStatusReport {
            measured: true,
            reading_cm: reading,
        }
    }

    /// Ping once, `None` if there was no echo or it was out of range.
    fn measure_valid(&mut self) -> Option<f64> {
        match self.ping() {
            Ping::Valid(d) => Some(d),
            Ping::OutOfRange | Ping::NoEcho => None
        }
    }

    fn ping(&mut self) -> Ping {
        match self.range.trigger_and_measure() {
            Ok(d) if d > 0.0 && d <= self.params.max_valid_range_cm => Ping::Valid(d),
            Ok(d) if d > self.params.max_valid_range_cm => Ping::OutOfRange,
            Ok(_) | Err(RangeError::NoEcho) => Ping::NoEcho,
        }
    }

    fn move_head(&mut self, angle_deg: i32) -> Result<(), ObsScanError> {
        self.servo.set_angle_deg(angle_deg)
            .map_err(ObsScanError::ServoError)?;
        self.head_angle_deg = angle_deg;
        self.delay.delay_ms(self.params.servo_settle_ms);

        Ok(())
    }
}

impl<R, S, D> State for ObsScan<R, S, D>
where
    R: RangeFinder,
    S: PanServo,
    D: DelayMs<u32>
{
    type InitData = ();
    type InitError = ObsScanError;

    type InputData = f64;
    type OutputData = ObstacleState;
    type StatusReport = ObsScanStatusReport;
    type ProcError = ObsScanError;

    /// Center the scan head.
    fn init(&mut self, _init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.move_head(self.params.servo_center_deg)
    }

    /// Make the periodic straight-ahead measurement if it is due.
    fn proc(&mut self, time_s: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let report = self.update(*time_s);

        if !self.sensor_available() {
            return Err(ObsScanError::SensorUnavailable(self.num_consec_timeouts))
        }

        Ok((self.obstacle_state(), report))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fakes::{fake_scan_head, FakeDelay, FakeRange, FakeServo};

    type TestScan = ObsScan<FakeRange, FakeServo, FakeDelay>;

    fn scanner(default: Result<f64, RangeError>) -> (TestScan, FakeRange, FakeDelay) {
        let (range, servo) = fake_scan_head(default);
        let delay = FakeDelay::default();
        let os = ObsScan::new(ObsScanParams::default(), range.clone(), servo, delay.clone());
        (os, range, delay)
    }

    #[test]
    fn test_measure_invalid() {
        let (mut os, range, _) = scanner(Err(RangeError::NoEcho));
        assert_eq!(os.measure(), 999.0);

        range.set_default(Ok(450.0));
        assert_eq!(os.measure(), 999.0);

        range.set_default(Ok(0.0));
        assert_eq!(os.measure(), 999.0);

        range.set_default(Ok(120.5));
        assert_eq!(os.measure(), 120.5);
    }

    #[test]
    fn test_periodic_blocked() {
        let (mut os, range, _) = scanner(Ok(25.0));

        // Nothing measured yet
        assert!(!os.is_blocked());
        assert_eq!(os.last_distance_cm(), 999.0);

        let (state, rpt) = os.proc(&0.0).unwrap();
        assert!(rpt.measured);
        assert!(state.blocked);
        assert_eq!(state.last_distance_cm, 25.0);

        // Exactly at the threshold is blocked
        range.set_default(Ok(30.0));
        os.proc(&0.3).unwrap();
        assert!(os.is_blocked());

        range.set_default(Ok(30.5));
        os.proc(&0.6).unwrap();
        assert!(!os.is_blocked());
    }

    #[test]
    fn test_periodic_rate_limited() {
        let (mut os, range, _) = scanner(Ok(100.0));
        os.proc(&1.0).unwrap();

        range.set_default(Ok(10.0));
        let (_, rpt) = os.proc(&1.2).unwrap();
        assert!(!rpt.measured);
        assert_eq!(os.last_distance_cm(), 100.0);

        let (_, rpt) = os.proc(&1.3).unwrap();
        assert!(rpt.measured);
        assert_eq!(os.last_distance_cm(), 10.0);
    }

    #[test]
    fn test_single_timeout_keeps_last_valid() {
        let (mut os, range, _) = scanner(Ok(20.0));
        os.proc(&0.0).unwrap();
        assert!(os.is_blocked());

        range.set_default(Err(RangeError::NoEcho));
        let (state, rpt) = os.proc(&0.5).unwrap();
        assert!(rpt.measured);
        assert_eq!(rpt.reading_cm, None);
        assert_eq!(state.last_distance_cm, 20.0);
        assert!(state.blocked);
        assert!(state.sensor_available);
    }

    #[test]
    fn test_sustained_timeout_is_blocked() {
        let (mut os, range, _) = scanner(Err(RangeError::NoEcho));

        for i in 0..9 {
            assert!(os.proc(&(i as f64)).is_ok());
            assert!(!os.is_blocked());
        }

        assert_eq!(os.proc(&9.0), Err(ObsScanError::SensorUnavailable(10)));
        assert!(os.is_blocked());
        assert!(!os.obstacle_state().sensor_available);

        // Lateral checks are never clear while unavailable
        range.set_at(150, Ok(300.0));
        assert!(!os.check_left_clear(30.0));

        // One valid reading recovers
        range.set_default(Ok(200.0));
        assert!(os.proc(&10.0).is_ok());
        assert!(!os.is_blocked());
        assert!(os.check_left_clear(30.0));
    }

    #[test]
    fn test_far_echo_keeps_sensor_available() {
        let (mut os, _, _) = scanner(Ok(650.0));

        for i in 0..20 {
            let (state, rpt) = os.proc(&(i as f64)).unwrap();
            assert_eq!(rpt.reading_cm, None);
            assert!(state.sensor_available);
            assert!(!state.blocked);
        }
        assert_eq!(os.last_distance_cm(), 999.0);
    }

    #[test]
    fn test_lateral_checks() {
        let (mut os, range, delay) = scanner(Ok(200.0));
        range.set_at(150, Ok(20.0));
        range.set_at(30, Ok(80.0));

        assert!(!os.check_left_clear(30.0));
        assert_eq!(os.head_angle_deg(), 150);
        assert_eq!(delay.total_ms(), 1000);

        assert!(os.check_right_clear(30.0));
        assert_eq!(os.head_angle_deg(), 30);

        os.return_to_center().unwrap();
        assert_eq!(os.head_angle_deg(), 90);
        assert_eq!(range.angle(), 90);

        // Already centred, no move and no settle
        let before = delay.total_ms();
        os.return_to_center().unwrap();
        assert_eq!(delay.total_ms(), before);

        // Scans never change the obstacle state
        assert_eq!(os.last_distance_cm(), 999.0);
    }

    #[test]
    fn test_no_echo_on_side_is_clear() {
        let (mut os, range, _) = scanner(Ok(200.0));
        range.set_at(30, Err(RangeError::NoEcho));
        assert!(os.check_right_clear(30.0));
    }

    #[test]
    fn test_scan_direction_clamps() {
        let (mut os, range, _) = scanner(Ok(50.0));

        assert_eq!(os.scan_direction(250), Ok(50.0));
        assert_eq!(os.head_angle_deg(), 180);

        assert_eq!(os.scan_direction(-20), Ok(50.0));
        assert_eq!(range.angle(), 0);
    }

    #[test]
    fn test_full_sweep() {
        let (mut os, range, delay) = scanner(Ok(100.0));
        range.set_at(90, Ok(45.0));

        let readings = os.full_sweep().unwrap();
        assert_eq!(
            readings,
            vec![(30, 100.0), (60, 100.0), (90, 45.0), (120, 100.0), (150, 100.0)]
        );

        // Ends centred
        assert_eq!(os.head_angle_deg(), 90);
        assert_eq!(range.angle_history(), vec![30, 60, 90, 120, 150, 90]);

        // 6 settles and 5 pauses
        assert_eq!(delay.total_ms(), 6 * 1000 + 5 * 300);
    }
}
