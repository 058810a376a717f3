//! # Simulated platform
//!
//! Stands in for the rover hardware so that the executable can run on a desktop. A single
//! [`SimWorld`] holds the rover's pose in a flat local frame and each simulated device reads
//! from or writes to it:
//!
//! - The motors set the wheel demands, which drive a differential-drive kinematic model.
//! - The gyro reports the clockwise yaw rate plus a constant bias.
//! - The satellite receiver emits a fix every period, unlocked during a short start-up delay.
//! - The rangefinder ray-casts against round obstacles and the circular arena wall.
//!
//! The world is advanced by calling [`Sim::step`] once per control cycle, before the modules are
//! processed.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod eqpt;
mod params;
mod world;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use eqpt::*;
pub use params::{SimObstacle, SimParams};
pub use world::SimWorld;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use crate::nav_arb::Equipment;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Equipment set backed by the simulation.
pub type SimEquipment = Equipment<SimGyro, SimGnss, SimRange, SimServo, SimMotors, SimDelay>;

/// Handle onto the simulated world.
pub struct Sim {
    world: SharedWorld,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Sim {
    /// Build the world and the equipment connected to it.
    pub fn new(params: SimParams) -> (Self, SimEquipment) {
        let delay = SimDelay { realtime: params.realtime_delays };
        let world = Rc::new(RefCell::new(SimWorld::new(params)));

        let eqpt = Equipment {
            gyro: SimGyro(world.clone()),
            gnss: SimGnss(world.clone()),
            range: SimRange(world.clone()),
            servo: SimServo(world.clone()),
            motors: SimMotors(world.clone()),
            delay,
        };

        (Self { world }, eqpt)
    }

    /// Advance the world to the given session time.
    pub fn step(&self, time_s: f64) {
        self.world.borrow_mut().step(time_s);
    }

    /// Local position and heading of the rover.
    ///
    /// Units: meters, meters, degrees
    pub fn pose(&self) -> (f64, f64, f64) {
        let world = self.world.borrow();
        let (x_m, y_m) = world.position_m();
        (x_m, y_m, world.heading_deg())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nav_arb::{ArbEvent, ArbParams, NavArb, NavMode};
    use comms_if::cmd::Cmd;
    use util::module::State;

    /// Drive the whole arbiter against the simulation until it reports arrival.
    #[test]
    fn test_navigate_to_waypoint_in_sim() {
        let (sim, eqpt) = Sim::new(SimParams { 
            realtime_delays: false, 
            gnss_lock_delay_s: 0.0,
            ..Default::default() 
        });
        let mut arb = NavArb::new(ArbParams::default(), eqpt);
        arb.init(()).unwrap();

        // About 15 m north-east of the origin
        let cycle_s = 0.02;
        let mut time_s = 0.0;
        sim.step(time_s);
        arb.proc(&time_s).unwrap();

        let set = Cmd::parse(r#"set 48°0'0.35"N,2°0'0.7"E"#).unwrap();
        assert!(arb.exec_cmd(&set, time_s).is_ok());
        assert!(arb.exec_cmd(&Cmd::parse("go").unwrap(), time_s).is_ok());

        let mut arrived = false;
        while time_s < 300.0 {
            time_s += cycle_s;
            sim.step(time_s);
            let (_, rpt) = arb.proc(&time_s).unwrap();

            if rpt.mode != NavMode::AutonomousNav {
                arrived = rpt.events
                    .iter()
                    .any(|e| matches!(e, ArbEvent::Arrived { .. }));
                break
            }
        }

        assert!(arrived, "Did not arrive, pose {:?}", sim.pose());

        let (x_m, y_m, _) = sim.pose();
        assert!(x_m > 5.0 && y_m > 5.0);
    }
}
