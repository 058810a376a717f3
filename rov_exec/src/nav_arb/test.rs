//! Scenario tests for the navigation arbiter

use super::*;
use crate::fakes::{
    fake_scan_head, FakeDelay, FakeGnss, FakeGyro, FakeMotors, FakeRange, FakeServo
};
use comms_if::{
    cmd::{Cmd, Response},
    eqpt::{MotorDems, WheelDem, WheelDir},
};
use util::module::State;

type TestArb = NavArb<FakeGyro, FakeGnss, FakeRange, FakeServo, FakeMotors, FakeDelay>;

/// Waypoint on the 48th parallel, one arcminute east of 2°E.
const EAST_WP: &str = r#"set 48°0'0"N,2°1'0"E"#;

/// Meters per degree of latitude.
const M_PER_DEG_LAT: f64 = 111_194.93;

struct Rig {
    arb: TestArb,
    gyro: FakeGyro,
    gnss: FakeGnss,
    range: FakeRange,
    motors: FakeMotors,
}

fn rig(identity: Option<u8>, range_cm: f64) -> Rig {
    let gyro = FakeGyro::new(identity);
    let gnss = FakeGnss::default();
    let (range, servo) = fake_scan_head(Ok(range_cm));
    let motors = FakeMotors::default();

    let mut arb = NavArb::new(
        ArbParams::default(),
        Equipment {
            gyro: gyro.clone(),
            gnss: gnss.clone(),
            range: range.clone(),
            servo,
            motors: motors.clone(),
            delay: FakeDelay::default(),
        }
    );

    let init = arb.init(());
    assert_eq!(init.is_ok(), identity == Some(0x70) || identity == Some(0x68));

    Rig { arb, gyro, gnss, range, motors }
}

fn cmd(line: &str) -> Cmd {
    Cmd::parse(line).unwrap()
}

impl Rig {
    fn exec(&mut self, line: &str, time_s: f64) -> Response {
        self.arb.exec_cmd(&cmd(line), time_s)
    }

    fn proc(&mut self, time_s: f64) -> (MotorDems, NavArbStatusReport) {
        self.arb.proc(&time_s).unwrap()
    }

    /// Put the rover at 48°N 2°E with a fresh fix and a waypoint to the east, then start
    /// navigating.
    fn start_east_nav(&mut self) {
        self.gnss.push_fix(48.0, 2.0, true);
        self.proc(0.0);
        assert!(self.exec(EAST_WP, 0.05).is_ok());
        assert!(self.exec("go", 0.1).is_ok());
        assert_eq!(self.arb.mode(), NavMode::AutonomousNav);
    }
}

#[test]
fn test_arrival_within_radius() {
    let mut r = rig(Some(0x70), 200.0);

    // 2.5 m south of the waypoint
    r.gnss.push_fix(48.0 - 2.5 / M_PER_DEG_LAT, 2.0, true);
    r.proc(0.0);

    assert!(r.exec(r#"set 48°0'0"N,2°0'0"E"#, 0.05).is_ok());
    assert!(r.exec("go", 0.1).is_ok());

    let (dems, rpt) = r.proc(0.2);

    assert!(!dems.is_moving());
    assert_eq!(r.arb.mode(), NavMode::Idle);
    assert!(matches!(
        rpt.events.as_slice(), 
        [ArbEvent::Arrived { distance_m }] if (distance_m - 2.5).abs() < 0.01
    ));

    // The waypoint is kept
    assert!(r.arb.waypoint().is_some());
}

#[test]
fn test_turn_towards_waypoint() {
    let mut r = rig(Some(0x70), 200.0);
    r.start_east_nav();

    // Bearing to the waypoint is just under 90, the error is about 10 deg to the right
    r.arb.head_est_mut().set_heading_deg(80.0);
    let (dems, _) = r.proc(0.2);

    assert_eq!(dems.left, WheelDem::forward(104));
    assert_eq!(dems.right, WheelDem::backward(104));

    let until_s = match r.arb.phase() {
        NavPhase::Turning { until_s } => until_s,
        p => panic!("Expected to be turning, got {:?}", p)
    };
    assert!((until_s - 0.2 - 0.2093).abs() < 1e-3);

    // Still turning
    let (dems, _) = r.proc(0.3);
    assert!(dems.is_moving());

    // Turn over, settle
    let (dems, _) = r.proc(0.45);
    assert!(!dems.is_moving());
    assert!(matches!(r.arb.phase(), NavPhase::Settling { .. }));
    assert_eq!(r.arb.mode(), NavMode::AutonomousNav);

    // Aligned after settling, drive forward
    r.arb.head_est_mut().set_heading_deg(90.0);
    let (dems, _) = r.proc(0.65);
    assert_eq!(dems, MotorDems::drive(WheelDem::forward(200), WheelDem::forward(200)));
    assert_eq!(r.arb.phase(), NavPhase::Assess);
}

#[test]
fn test_turn_left_for_negative_error() {
    let mut r = rig(Some(0x70), 200.0);
    r.start_east_nav();

    r.arb.head_est_mut().set_heading_deg(100.0);
    let (dems, _) = r.proc(0.2);

    assert_eq!(dems.left, WheelDem::backward(104));
    assert_eq!(dems.right, WheelDem::forward(104));
}

#[test]
fn test_forward_only_without_heading() {
    // Unexpected identity, the heading is never available
    let mut r = rig(Some(0x12), 200.0);

    r.gnss.push_fix(48.0, 2.0, true);
    r.proc(0.0);
    assert!(r.exec(EAST_WP, 0.05).is_ok());

    match r.exec("go", 0.1) {
        Response::Done(msg) => assert!(msg.contains("forward only")),
        other => panic!("Unexpected response {:?}", other)
    }

    let (dems, rpt) = r.proc(0.2);
    assert!(!rpt.heading_healthy);
    assert_eq!(dems, MotorDems::drive(WheelDem::forward(200), WheelDem::forward(200)));
    assert_eq!(r.arb.phase(), NavPhase::Assess);
}

#[test]
fn test_frontal_obstacle_gating() {
    let mut r = rig(Some(0x70), 25.0);

    let (_, rpt) = r.proc(0.0);
    assert!(rpt.blocked);
    assert_eq!(rpt.events, vec![ArbEvent::ObstacleDetected { distance_cm: 25.0 }]);

    assert!(r.exec("forward", 0.1).is_blocked());
    assert!(r.exec("z", 0.1).is_blocked());

    // Diagonals are refused before the side is even scanned
    assert!(r.exec("forward_left", 0.1).is_blocked());
    assert_eq!(r.range.angle_history(), vec![90]);
    assert!(r.motors.last().map_or(true, |d| !d.is_moving()));

    // Exactly at the threshold is still blocked
    r.range.set_default(Ok(30.0));
    r.proc(0.4);
    assert!(r.exec("z", 0.45).is_blocked());

    r.range.set_default(Ok(30.5));
    let (_, rpt) = r.proc(0.8);
    assert_eq!(rpt.events, vec![ArbEvent::PathClear]);
    assert!(r.exec("z", 0.85).is_ok());
    assert_eq!(r.arb.mode(), NavMode::ManualAvoidance);
}

#[test]
fn test_lateral_checks_independent_of_front() {
    let mut r = rig(Some(0x70), 25.0);
    r.proc(0.0);

    // Front blocked, left clear
    r.range.set_at(150, Ok(100.0));
    assert!(r.exec("q", 0.1).is_ok());
    assert_eq!(r.range.angle_history(), vec![90, 150, 90]);
    assert_eq!(r.range.angle(), 90);

    let dems = r.arb.motor_dems();
    assert_eq!(dems.left.dir, WheelDir::Backward);
    assert_eq!(dems.right.dir, WheelDir::Forward);

    // A bounded pivot is not stopped by the obstacle ahead
    let (dems, rpt) = r.proc(0.15);
    assert!(dems.is_moving());
    assert!(!rpt.events.contains(&ArbEvent::SafetyStop));

    // Right side blocked, the head is re-centred anyway
    r.range.set_at(30, Ok(20.0));
    assert!(r.exec("right", 0.2).is_blocked());
    assert_eq!(r.range.angle(), 90);
}

#[test]
fn test_safety_stop() {
    let mut r = rig(Some(0x70), 200.0);
    r.proc(0.0);

    assert!(r.exec("forward", 0.05).is_ok());
    r.range.set_default(Ok(20.0));

    // Measurement not due yet
    let (dems, _) = r.proc(0.1);
    assert!(dems.is_moving());

    let (dems, rpt) = r.proc(0.35);
    assert!(!dems.is_moving());
    assert_eq!(r.arb.mode(), NavMode::Idle);
    assert_eq!(
        rpt.events, 
        vec![ArbEvent::ObstacleDetected { distance_cm: 20.0 }, ArbEvent::SafetyStop]
    );

    // Reversing is stopped too while the obstacle is still there
    assert!(r.exec("s", 0.4).is_ok());
    let (dems, rpt) = r.proc(0.45);
    assert!(rpt.blocked);
    assert!(!dems.is_moving());
    assert_eq!(rpt.events, vec![ArbEvent::SafetyStop]);
    assert_eq!(r.arb.mode(), NavMode::Idle);
}

#[test]
fn test_pivot_timeout() {
    let mut r = rig(Some(0x70), 200.0);
    r.proc(0.0);

    assert!(r.exec("q", 1.0).is_ok());
    assert_eq!(r.arb.mode(), NavMode::ManualAvoidance);

    let (dems, _) = r.proc(1.1);
    assert!(dems.is_moving());

    let (dems, rpt) = r.proc(1.25);
    assert!(!dems.is_moving());
    assert_eq!(rpt.mode, NavMode::Idle);
}

#[test]
fn test_stale_fix_ends_nav() {
    let mut r = rig(None, 200.0);
    r.start_east_nav();

    let (dems, _) = r.proc(0.2);
    assert!(dems.is_moving());

    let (dems, rpt) = r.proc(5.5);
    assert!(!dems.is_moving());
    assert_eq!(r.arb.mode(), NavMode::Idle);
    assert!(matches!(
        rpt.events.as_slice(), 
        [ArbEvent::PositionLost { fix_age_s: Some(_) }]
    ));
}

#[test]
fn test_nav_timeout() {
    let mut r = rig(None, 200.0);
    r.start_east_nav();

    r.gnss.push_fix(48.0, 2.0, true);
    let (dems, _) = r.proc(600.0);
    assert!(dems.is_moving());

    r.gnss.push_fix(48.0, 2.0, true);
    let (dems, rpt) = r.proc(700.0);
    assert!(!dems.is_moving());
    assert_eq!(rpt.events, vec![ArbEvent::NavTimeout]);
    assert!(!r.arb.is_navigating());
}

#[test]
fn test_motion_blocked_during_nav() {
    let mut r = rig(None, 200.0);
    r.start_east_nav();
    r.proc(0.2);

    for line in &["forward", "z", "s", "q", "backward_right", "r"] {
        assert!(r.exec(line, 0.25).is_blocked(), "{} was not blocked", line);
    }
    assert!(r.exec("calibrate", 0.25).is_rejected());
    assert!(r.exec("i", 0.25).is_ok());
    assert!(r.arb.is_navigating());

    // Stop always wins
    assert_eq!(r.exec("x", 0.3), Response::Done("navigation stopped".into()));
    assert_eq!(r.arb.mode(), NavMode::Idle);
    assert!(!r.arb.motor_dems().is_moving());
}

#[test]
fn test_go_preconditions() {
    let mut r = rig(Some(0x70), 200.0);
    r.proc(0.0);

    // No waypoint
    assert!(r.exec("go", 0.1).is_rejected());

    // No fix
    assert!(r.exec(EAST_WP, 0.1).is_ok());
    assert!(r.exec("go", 0.1).is_rejected());

    // Unlocked fixes do not count
    r.gnss.push_fix(48.0, 2.0, false);
    r.proc(0.2);
    assert!(r.exec("go", 0.25).is_rejected());

    // Fix too old
    r.gnss.push_fix(48.0, 2.0, true);
    r.proc(0.3);
    assert!(r.exec("go", 10.0).is_rejected());
    assert_eq!(r.arb.mode(), NavMode::Idle);

    // Manual motion is stopped on go
    assert!(r.exec("z", 1.0).is_ok());
    assert!(r.exec("go", 1.0).is_ok());
    assert!(!r.arb.motor_dems().is_moving());
}

#[test]
fn test_malformed_waypoint() {
    let mut r = rig(Some(0x70), 200.0);

    assert!(r.exec(EAST_WP, 0.0).is_ok());
    let wp = r.arb.waypoint();

    assert!(r.exec(r#"set 48°0'0"N"#, 0.1).is_rejected());
    assert!(r.exec("set 48.5,2.3", 0.1).is_rejected());
    assert!(r.exec(r#"set 48°0'0"N,2°1'0"X"#, 0.1).is_rejected());

    assert_eq!(r.arb.waypoint(), wp);
}

#[test]
fn test_set_reports_distance() {
    let mut r = rig(Some(0x70), 200.0);

    match r.exec(EAST_WP, 0.0) {
        Response::Done(msg) => assert!(msg.contains("no position fix")),
        other => panic!("Unexpected response {:?}", other)
    }

    r.gnss.push_fix(48.0, 2.0, true);
    r.proc(0.1);

    match r.exec(EAST_WP, 0.2) {
        Response::Done(msg) => {
            assert!(msg.contains("distance 1240."), "{}", msg);
            assert!(msg.contains("bearing 90.0"), "{}", msg);
        },
        other => panic!("Unexpected response {:?}", other)
    }
}

#[test]
fn test_calibrate_only_when_stationary() {
    let mut r = rig(Some(0x70), 200.0);
    r.proc(0.0);

    assert!(r.exec("z", 0.1).is_ok());
    assert!(r.exec("calibrate", 0.1).is_rejected());
    assert!(r.exec("mpu_reset", 0.1).is_rejected());

    assert!(r.exec("x", 0.2).is_ok());
    r.gyro.set_raw_rate(131);
    match r.exec("calibrate", 0.3) {
        Response::Done(msg) => assert!(msg.contains("1.000")),
        other => panic!("Unexpected response {:?}", other)
    }
}

#[test]
fn test_reset_recovers_faulted_gyro() {
    let mut r = rig(Some(0x12), 200.0);
    assert!(!r.arb.status().gyro_ok);

    r.gyro.0.borrow_mut().identity = Some(0x68);
    assert!(r.exec("mpu_reset", 0.0).is_ok());

    let status = r.arb.status();
    assert!(status.gyro_ok);
    assert_eq!(status.heading_deg, Some(0.0));
}

#[test]
fn test_status_snapshot() {
    let mut r = rig(None, 120.0);
    r.proc(0.0);

    let status = match r.exec("status", 0.1) {
        Response::Status(s) => s,
        other => panic!("Unexpected response {:?}", other)
    };
    assert_eq!(status.distance_cm, 120.0);
    assert!(!status.obstacle);
    assert!(!status.gps_valid);
    assert_eq!(status.latitude, None);
    assert!(!status.gyro_ok);
    assert_eq!(status.heading_deg, None);
    assert!(!status.navigating);
    assert_eq!(status.mode, "Idle");

    r.gnss.push_fix(51.5, -0.12, true);
    r.proc(0.1);
    let status = r.arb.status();
    assert!(status.gps_valid);
    assert_eq!(status.latitude, Some(51.5));
    assert_eq!(status.longitude, Some(-0.12));
}

#[test]
fn test_diagnostics() {
    let mut r = rig(Some(0x70), 200.0);
    r.proc(0.0);

    match r.exec("r", 0.1) {
        Response::Text(lines) => assert_eq!(lines.len(), 5),
        other => panic!("Unexpected response {:?}", other)
    }
    assert_eq!(r.range.angle(), 90);

    match r.exec("gyro_test", 0.1) {
        Response::Text(lines) => assert_eq!(lines.len(), 10),
        other => panic!("Unexpected response {:?}", other)
    }

    match r.exec("speed_test", 0.1) {
        Response::Text(lines) => assert_eq!(lines.len(), 9),
        other => panic!("Unexpected response {:?}", other)
    }

    match r.exec("mpu_debug", 0.1) {
        Response::Text(lines) => assert!(lines[0].contains("0x70")),
        other => panic!("Unexpected response {:?}", other)
    }
}

#[test]
fn test_turn_duration() {
    let r = rig(Some(0x70), 200.0);

    assert!((r.arb.turn_duration_s(8.0) - 0.2).abs() < 1e-9);
    assert!((r.arb.turn_duration_s(180.0) - 1.0).abs() < 1e-9);
    assert!((r.arb.turn_duration_s(-94.0) - 0.6).abs() < 1e-9);
    assert!((r.arb.turn_duration_s(7.0) - 0.2).abs() < 1e-9);
}
