//! Simulated equipment
//!
//! Every device is a handle onto the shared [`SimWorld`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc, thread, time::Duration};

use embedded_hal::blocking::delay::DelayMs;

use super::SimWorld;
use comms_if::eqpt::{
    GnssFix, GnssReceiver, ImuError, MotorDems, MotorDriver, MotorError, PanServo, RangeError,
    RangeFinder, RateGyro, ServoError,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub type SharedWorld = Rc<RefCell<SimWorld>>;

pub struct SimGyro(pub(super) SharedWorld);

pub struct SimGnss(pub(super) SharedWorld);

pub struct SimRange(pub(super) SharedWorld);

pub struct SimServo(pub(super) SharedWorld);

pub struct SimMotors(pub(super) SharedWorld);

/// Delay which either sleeps for real or returns straight away.
#[derive(Debug, Clone, Copy)]
pub struct SimDelay {
    pub realtime: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RateGyro for SimGyro {
    fn identify(&mut self) -> Result<u8, ImuError> {
        Ok(self.0.borrow().params.gyro_identity)
    }

    fn configure(&mut self) -> Result<(), ImuError> {
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ImuError> {
        Ok(())
    }

    fn read_raw_rate_z(&mut self) -> Result<i16, ImuError> {
        let world = self.0.borrow();
        let rate_dps = world.yaw_rate_dps + world.params.gyro_bias_dps;
        let raw = (rate_dps * Self::LSB_PER_DPS).round();

        Ok(raw.max(i16::MIN as f64).min(i16::MAX as f64) as i16)
    }
}

impl GnssReceiver for SimGnss {
    fn poll_fix(&mut self) -> Option<GnssFix> {
        let mut world = self.0.borrow_mut();
        let time_s = world.time_s;

        if let Some(t) = world.last_fix_s {
            if time_s - t < world.params.gnss_period_s {
                return None
            }
        }
        world.last_fix_s = Some(time_s);

        let position = world.geo_position();

        Some(GnssFix {
            latitude_deg: position.lat_deg,
            longitude_deg: position.lng_deg,
            locked: time_s >= world.params.gnss_lock_delay_s,
        })
    }
}

impl RangeFinder for SimRange {
    /// The arena wall guarantees an echo, beyond the sensor's range or not.
    fn trigger_and_measure(&mut self) -> Result<f64, RangeError> {
        let world = self.0.borrow();

        // 90 deg is straight ahead, larger angles look left
        let bearing_deg = world.heading_deg() + 90.0 - world.servo_angle_deg as f64;

        Ok(world.range_m(bearing_deg) * 100.0)
    }
}

impl PanServo for SimServo {
    fn set_angle_deg(&mut self, angle_deg: i32) -> Result<(), ServoError> {
        if !(0..=180).contains(&angle_deg) {
            return Err(ServoError::OutOfRange(angle_deg))
        }

        self.0.borrow_mut().servo_angle_deg = angle_deg;
        Ok(())
    }
}

impl MotorDriver for SimMotors {
    fn set_outputs(&mut self, dems: &MotorDems) -> Result<(), MotorError> {
        self.0.borrow_mut().dems = *dems;
        Ok(())
    }
}

impl DelayMs<u32> for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        if self.realtime {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{SimObstacle, SimParams};
    use comms_if::eqpt::WheelDem;

    fn shared(params: SimParams) -> SharedWorld {
        Rc::new(RefCell::new(SimWorld::new(params)))
    }

    #[test]
    fn test_gyro_reports_bias_and_rate() {
        let world = shared(SimParams::default());
        let mut gyro = SimGyro(world.clone());

        // Bias only while stationary
        world.borrow_mut().step(0.0);
        assert!((gyro.read_rate_z_dps().unwrap() - 0.8).abs() < 0.01);

        SimMotors(world.clone())
            .set_outputs(&MotorDems::drive(WheelDem::backward(51), WheelDem::forward(51)))
            .unwrap();
        world.borrow_mut().step(0.1);

        // Pivoting left is counter-clockwise
        assert!(gyro.read_rate_z_dps().unwrap() < -20.0);
    }

    #[test]
    fn test_gnss_period_and_lock() {
        let world = shared(SimParams::default());
        let mut gnss = SimGnss(world.clone());

        world.borrow_mut().step(0.0);
        let fix = gnss.poll_fix().unwrap();
        assert!(!fix.locked);
        assert_eq!(fix.latitude_deg, 48.0);
        assert!(gnss.poll_fix().is_none());

        world.borrow_mut().step(2.5);
        assert!(gnss.poll_fix().unwrap().locked);
    }

    #[test]
    fn test_range_follows_servo() {
        let world = shared(SimParams {
            obstacles: vec![SimObstacle { x_m: -1.0, y_m: 0.0, radius_m: 0.2 }],
            ..Default::default()
        });
        let mut range = SimRange(world.clone());
        let mut servo = SimServo(world.clone());

        // Obstacle due west, the rover faces north
        servo.set_angle_deg(180).unwrap();
        assert!((range.trigger_and_measure().unwrap() - 80.0).abs() < 1e-6);

        servo.set_angle_deg(90).unwrap();
        assert!((range.trigger_and_measure().unwrap() - 5000.0).abs() < 1e-6);

        assert_eq!(servo.set_angle_deg(200), Err(ServoError::OutOfRange(200)));
    }
}
