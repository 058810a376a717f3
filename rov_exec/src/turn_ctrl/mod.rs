//! # Turn Speed Controller module
//!
//! Maps a heading error onto the PWM duty used to pivot towards it. Small errors get the minimum
//! speed that still overcomes the drivetrain's friction, large ones the maximum, with two linear
//! ramps in between:
//!
//! | `|error|`        | speed                        |
//! |------------------|------------------------------|
//! | `<= 8`           | `min`                        |
//! | `8 ..= 20`       | `min ..= min + 25`           |
//! | `20 ..= 45`      | `min + 25 ..= min + 50`      |
//! | `> 45`           | `max`                        |
//!
//! The result is always clamped into `[min, max]`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

pub use params::TurnCtrlParams;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::{clamp, lin_map, norm_angle_delta_deg};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TurnCtrl {
    params: TurnCtrlParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurnCtrl {
    pub fn new(params: TurnCtrlParams) -> Self {
        Self { params }
    }

    /// Pivot speed for the given heading error.
    ///
    /// Only the magnitude of the error matters. Errors outside `(-180, 180]` are normalised
    /// first, a non-finite error gives the minimum speed.
    pub fn speed_for_angle_error(&self, error_deg: f64) -> u8 {
        let p = &self.params;
        let min = p.min_speed as f64;
        let max = p.max_speed as f64;

        // The sign is dropped before normalising so that +e and -e take the same path
        let abs_error = norm_angle_delta_deg(error_deg.abs()).abs();
        if abs_error.is_nan() {
            return p.min_speed
        }

        let speed = if abs_error <= p.dead_band_deg {
            min
        }
        else if abs_error <= p.fine_band_deg {
            lin_map(
                (p.dead_band_deg, p.fine_band_deg),
                (min, min + p.fine_ramp),
                abs_error
            )
        }
        else if abs_error <= p.coarse_band_deg {
            lin_map(
                (p.fine_band_deg, p.coarse_band_deg),
                (min + p.fine_ramp, min + p.fine_ramp + p.coarse_ramp),
                abs_error
            )
        }
        else {
            max
        };

        clamp(speed.floor(), min, max) as u8
    }

    /// The `speed_test` diagnostic table, one line per configured error.
    pub fn speed_table(&self) -> Vec<String> {
        self.params.speed_test_errors_deg
            .iter()
            .map(|e| format!(
                "error {:>5.0} deg -> speed {}", 
                e, 
                self.speed_for_angle_error(*e)
            ))
            .collect()
    }
}
