//! Simulated world: rover kinematics and the geometry the rangefinder sees

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};

use super::{SimObstacle, SimParams};
use comms_if::eqpt::MotorDems;
use util::{
    geo::{GeoPoint, EARTH_RADIUS_M},
    maths::norm_angle_deg,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of the simulated rover in a flat local frame, x east and y north.
pub struct SimWorld {
    pub(super) params: SimParams,

    /// Time of the last step.
    ///
    /// Units: seconds
    pub(super) time_s: f64,

    last_step_s: Option<f64>,

    /// Units: meters
    x_m: f64,

    /// Units: meters
    y_m: f64,

    /// Clockwise from north.
    ///
    /// Units: degrees
    heading_deg: f64,

    /// Clockwise yaw rate over the last step.
    ///
    /// Units: degrees/second
    pub(super) yaw_rate_dps: f64,

    pub(super) dems: MotorDems,

    pub(super) servo_angle_deg: i32,

    pub(super) last_fix_s: Option<f64>,

    /// True while the rover is pushing against something.
    bumped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimWorld {
    pub fn new(params: SimParams) -> Self {
        let heading_deg = norm_angle_deg(params.initial_heading_deg);

        Self {
            params,
            time_s: 0.0,
            last_step_s: None,
            x_m: 0.0,
            y_m: 0.0,
            heading_deg,
            yaw_rate_dps: 0.0,
            dems: MotorDems::stopped(),
            servo_angle_deg: 90,
            last_fix_s: None,
            bumped: false,
        }
    }

    /// Advance the simulation to `time_s`, driving with the current motor demands.
    ///
    /// Uses the arc motion model: the rover turns about the midpoint heading of the step.
    pub fn step(&mut self, time_s: f64) {
        let dt = match self.last_step_s {
            Some(t) => (time_s - t).max(0.0),
            None => 0.0
        };
        self.last_step_s = Some(time_s);
        self.time_s = time_s;

        let (v_left, v_right) = self.wheel_speeds_mps();

        self.yaw_rate_dps = ((v_left - v_right) / self.params.wheel_base_m).to_degrees();
        let speed_mps = 0.5 * (v_left + v_right);

        let mid_heading = (self.heading_deg + 0.5 * self.yaw_rate_dps * dt).to_radians();
        let x_m = self.x_m + speed_mps * mid_heading.sin() * dt;
        let y_m = self.y_m + speed_mps * mid_heading.cos() * dt;

        self.heading_deg = norm_angle_deg(self.heading_deg + self.yaw_rate_dps * dt);

        // Obstacles and the wall stop translation, not rotation
        if self.is_free(x_m, y_m) {
            self.x_m = x_m;
            self.y_m = y_m;
            self.bumped = false;
        }
        else if !self.bumped {
            warn!("Sim: rover bumped into something at ({:.2}, {:.2})", self.x_m, self.y_m);
            self.bumped = true;
        }

        trace!(
            "Sim: pos ({:.2}, {:.2}) m, heading {:.1} deg, yaw rate {:.1} deg/s",
            self.x_m, self.y_m, self.heading_deg, self.yaw_rate_dps
        );
    }

    /// Local position.
    ///
    /// Units: meters
    pub fn position_m(&self) -> (f64, f64) {
        (self.x_m, self.y_m)
    }

    /// Units: degrees
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    /// Geographic position of the rover, using an equirectangular projection about the origin.
    pub fn geo_position(&self) -> GeoPoint {
        let m_per_deg = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let lat_deg = self.params.origin_lat_deg + self.y_m / m_per_deg;
        let lng_deg = self.params.origin_lng_deg 
            + self.x_m / (m_per_deg * self.params.origin_lat_deg.to_radians().cos());

        GeoPoint::new(lat_deg, lng_deg)
    }

    /// Distance to the nearest surface along a horizontal ray from the rover.
    ///
    /// `bearing_deg` is clockwise from north. Inside the arena there is always a hit.
    ///
    /// Units: meters
    pub fn range_m(&self, bearing_deg: f64) -> f64 {
        let b = bearing_deg.to_radians();
        let dir = (b.sin(), b.cos());
        let origin = (self.x_m, self.y_m);

        let wall = SimObstacle { x_m: 0.0, y_m: 0.0, radius_m: self.params.arena_radius_m };

        self.params.obstacles
            .iter()
            .filter_map(|o| ray_circle_entry(origin, dir, o))
            .fold(ray_circle_exit(origin, dir, &wall), f64::min)
    }

    fn wheel_speeds_mps(&self) -> (f64, f64) {
        if !self.dems.enabled {
            return (0.0, 0.0)
        }

        let max = self.params.max_wheel_speed_mps;
        (
            self.dems.left.signed_fraction() * max, 
            self.dems.right.signed_fraction() * max
        )
    }

    fn is_free(&self, x_m: f64, y_m: f64) -> bool {
        let in_arena = x_m.hypot(y_m) < self.params.arena_radius_m;
        let hits_obstacle = self.params.obstacles
            .iter()
            .any(|o| (x_m - o.x_m).hypot(y_m - o.y_m) < o.radius_m);

        in_arena && !hits_obstacle
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Distance along the unit ray to where it enters the circle, zero if it starts inside.
fn ray_circle_entry(origin: (f64, f64), dir: (f64, f64), circle: &SimObstacle) -> Option<f64> {
    let (b, c, disc) = ray_circle_terms(origin, dir, circle);

    // Outside and pointing away
    if c > 0.0 && b > 0.0 {
        return None
    }
    if disc < 0.0 {
        return None
    }

    Some((-b - disc.sqrt()).max(0.0))
}

/// Distance along the unit ray to where it leaves the circle.
fn ray_circle_exit(origin: (f64, f64), dir: (f64, f64), circle: &SimObstacle) -> f64 {
    let (b, _, disc) = ray_circle_terms(origin, dir, circle);
    (-b + disc.max(0.0).sqrt()).max(0.0)
}

fn ray_circle_terms(origin: (f64, f64), dir: (f64, f64), circle: &SimObstacle) -> (f64, f64, f64) {
    let m = (origin.0 - circle.x_m, origin.1 - circle.y_m);
    let b = m.0 * dir.0 + m.1 * dir.1;
    let c = m.0 * m.0 + m.1 * m.1 - circle.radius_m * circle.radius_m;

    (b, c, b * b - c)
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::WheelDem;

    fn world(obstacles: Vec<SimObstacle>) -> SimWorld {
        SimWorld::new(SimParams { obstacles, ..Default::default() })
    }

    #[test]
    fn test_straight_line() {
        let mut w = world(vec![]);
        w.dems = MotorDems::drive(WheelDem::forward(255), WheelDem::forward(255));

        w.step(0.0);
        w.step(2.0);

        let (x, y) = w.position_m();
        assert!(x.abs() < 1e-9);
        assert!((y - 0.6).abs() < 1e-9);
        assert_eq!(w.yaw_rate_dps, 0.0);

        // North of the origin
        let p = w.geo_position();
        assert!(p.lat_deg > 48.0);
        assert!((GeoPoint::new(48.0, 2.0).distance_to(&p) - 0.6).abs() < 1e-3);
    }

    #[test]
    fn test_pivot_right_is_clockwise() {
        let mut w = world(vec![]);
        w.dems = MotorDems::drive(WheelDem::forward(255), WheelDem::backward(255));

        w.step(0.0);
        w.step(0.5);

        // 0.6 m/s wheel speed difference over a 0.3 m base
        let expected_dps = 2.0_f64.to_degrees();
        assert!((w.yaw_rate_dps - expected_dps).abs() < 1e-9);
        assert!((w.heading_deg() - expected_dps * 0.5).abs() < 1e-9);

        let (x, y) = w.position_m();
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_disabled_driver_does_not_move() {
        let mut w = world(vec![]);
        let mut dems = MotorDems::drive(WheelDem::forward(200), WheelDem::forward(200));
        dems.enabled = false;
        w.dems = dems;

        w.step(0.0);
        w.step(1.0);
        assert_eq!(w.position_m(), (0.0, 0.0));
    }

    #[test]
    fn test_range_to_obstacle_and_wall() {
        let w = world(vec![SimObstacle { x_m: 0.0, y_m: 2.0, radius_m: 0.5 }]);

        assert!((w.range_m(0.0) - 1.5).abs() < 1e-9);
        assert!((w.range_m(180.0) - 50.0).abs() < 1e-9);
        assert!((w.range_m(90.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_stops_translation() {
        let mut w = world(vec![SimObstacle { x_m: 0.0, y_m: 0.5, radius_m: 0.3 }]);
        w.dems = MotorDems::drive(WheelDem::forward(255), WheelDem::forward(255));

        w.step(0.0);
        w.step(0.25);
        let (_, y) = w.position_m();
        assert!((y - 0.075).abs() < 1e-9);

        // Would end up inside the obstacle
        w.step(1.0);
        assert_eq!(w.position_m().1, y);
    }
}
