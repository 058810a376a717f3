//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f64 = 360.0;

/// Degrees in a half turn.
pub const HALF_TURN_DEG: f64 = 180.0;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
///
/// The value is not clamped, values outside the source range extrapolate linearly.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Clamp `value` into `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: PartialOrd
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// Due to floating point round-off the result may equal `rhs.abs()` when `lhs` is a tiny negative
/// number, callers needing a half-open range must handle that case.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Reduce an angle in degrees into `[0, 360)`.
///
/// Non-finite inputs produce `NaN`.
pub fn norm_angle_deg(angle_deg: f64) -> f64 {
    let a = rem_euclid(angle_deg, FULL_TURN_DEG);

    // rem_euclid can round up to exactly a full turn
    if a >= FULL_TURN_DEG {
        0.0
    }
    else {
        a
    }
}

/// Reduce an angular difference in degrees into `(-180, 180]`, i.e. the shortest signed turn.
///
/// Positive values are clockwise (to the right) when the angles are compass headings.
pub fn norm_angle_delta_deg(delta_deg: f64) -> f64 {
    let a = norm_angle_deg(delta_deg);

    if a > HALF_TURN_DEG {
        a - FULL_TURN_DEG
    }
    else {
        a
    }
}
