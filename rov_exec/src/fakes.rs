//! # Equipment fakes
//!
//! Scripted stand-ins for the equipment traits. Each fake is a cheap handle onto shared state so
//! a test can keep a clone and inspect or change the state after the fake has been moved into the
//! module under test.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use comms_if::eqpt::{
    GnssFix, GnssReceiver, ImuError, MotorDems, MotorDriver, MotorError, PanServo, RangeError,
    RangeFinder, RateGyro, ServoError,
};
use embedded_hal::blocking::delay::DelayMs;

// ------------------------------------------------------------------------------------------------
// GYRO
// ------------------------------------------------------------------------------------------------

pub struct FakeGyroState {
    /// Identity returned by the device, `None` if it does not acknowledge.
    pub identity: Option<u8>,

    /// Raw rate returned by every read.
    pub raw_rate: i16,

    pub fail_reads: bool,

    pub configured: bool,

    pub num_resets: usize,

    pub num_reads: usize,
}

#[derive(Clone)]
pub struct FakeGyro(pub Rc<RefCell<FakeGyroState>>);

impl FakeGyro {
    pub fn new(identity: Option<u8>) -> Self {
        Self(Rc::new(RefCell::new(FakeGyroState {
            identity,
            raw_rate: 0,
            fail_reads: false,
            configured: false,
            num_resets: 0,
            num_reads: 0,
        })))
    }

    pub fn set_raw_rate(&self, raw: i16) {
        self.0.borrow_mut().raw_rate = raw;
    }
}

impl RateGyro for FakeGyro {
    fn identify(&mut self) -> Result<u8, ImuError> {
        self.0.borrow().identity.ok_or(ImuError::NoAck)
    }

    fn configure(&mut self) -> Result<(), ImuError> {
        let mut s = self.0.borrow_mut();
        match s.identity {
            Some(_) => {
                s.configured = true;
                Ok(())
            }
            None => Err(ImuError::NoAck),
        }
    }

    fn reset(&mut self) -> Result<(), ImuError> {
        let mut s = self.0.borrow_mut();
        s.num_resets += 1;
        s.configured = false;
        Ok(())
    }

    fn read_raw_rate_z(&mut self) -> Result<i16, ImuError> {
        let mut s = self.0.borrow_mut();
        s.num_reads += 1;
        if s.fail_reads || s.identity.is_none() {
            return Err(ImuError::Bus("read failed".into()));
        }
        Ok(s.raw_rate)
    }
}

// ------------------------------------------------------------------------------------------------
// GNSS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeGnss(pub Rc<RefCell<VecDeque<GnssFix>>>);

impl FakeGnss {
    pub fn push_fix(&self, lat: f64, lng: f64, locked: bool) {
        self.0.borrow_mut().push_back(GnssFix {
            latitude_deg: lat,
            longitude_deg: lng,
            locked,
        });
    }
}

impl GnssReceiver for FakeGnss {
    fn poll_fix(&mut self) -> Option<GnssFix> {
        self.0.borrow_mut().pop_front()
    }
}

// ------------------------------------------------------------------------------------------------
// SCAN HEAD (RANGEFINDER + SERVO)
// ------------------------------------------------------------------------------------------------

/// What the rangefinder sees, depending on where the servo points.
pub struct FakeScene {
    pub angle_deg: i32,

    /// Reading used for angles without an entry in `by_angle`.
    pub default: Result<f64, RangeError>,

    pub by_angle: HashMap<i32, Result<f64, RangeError>>,

    /// Every angle the servo was commanded to, in order.
    pub angle_history: Vec<i32>,

    pub num_pings: usize,
}

#[derive(Clone)]
pub struct FakeRange(pub Rc<RefCell<FakeScene>>);

#[derive(Clone)]
pub struct FakeServo(pub Rc<RefCell<FakeScene>>);

/// Create a rangefinder and servo looking at the same scene, reading `default` everywhere.
pub fn fake_scan_head(default: Result<f64, RangeError>) -> (FakeRange, FakeServo) {
    let scene = Rc::new(RefCell::new(FakeScene {
        angle_deg: 90,
        default,
        by_angle: HashMap::new(),
        angle_history: Vec::new(),
        num_pings: 0,
    }));

    (FakeRange(scene.clone()), FakeServo(scene))
}

impl FakeRange {
    pub fn set_default(&self, reading: Result<f64, RangeError>) {
        self.0.borrow_mut().default = reading;
    }

    pub fn set_at(&self, angle_deg: i32, reading: Result<f64, RangeError>) {
        self.0.borrow_mut().by_angle.insert(angle_deg, reading);
    }

    pub fn angle(&self) -> i32 {
        self.0.borrow().angle_deg
    }

    pub fn angle_history(&self) -> Vec<i32> {
        self.0.borrow().angle_history.clone()
    }
}

impl RangeFinder for FakeRange {
    fn trigger_and_measure(&mut self) -> Result<f64, RangeError> {
        let mut s = self.0.borrow_mut();
        s.num_pings += 1;
        let angle = s.angle_deg;
        s.by_angle.get(&angle).copied().unwrap_or(s.default)
    }
}

impl PanServo for FakeServo {
    fn set_angle_deg(&mut self, angle_deg: i32) -> Result<(), ServoError> {
        if !(0..=180).contains(&angle_deg) {
            return Err(ServoError::OutOfRange(angle_deg));
        }
        let mut s = self.0.borrow_mut();
        s.angle_deg = angle_deg;
        s.angle_history.push(angle_deg);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// MOTORS
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FakeMotors {
    pub history: Rc<RefCell<Vec<MotorDems>>>,
    pub fail: Rc<Cell<bool>>,
}

impl FakeMotors {
    pub fn last(&self) -> Option<MotorDems> {
        self.history.borrow().last().copied()
    }
}

impl MotorDriver for FakeMotors {
    fn set_outputs(&mut self, dems: &MotorDems) -> Result<(), MotorError> {
        if self.fail.get() {
            return Err(MotorError::Output("driver unplugged".into()));
        }
        self.history.borrow_mut().push(*dems);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// DELAY
// ------------------------------------------------------------------------------------------------

/// A delay which returns immediately, counting the total time it was asked to wait.
#[derive(Clone, Default)]
pub struct FakeDelay(pub Rc<Cell<u64>>);

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.0.get()
    }
}

impl DelayMs<u32> for FakeDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.set(self.0.get() + ms as u64);
    }
}
