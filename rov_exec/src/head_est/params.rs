//! Parameters structure for HeadEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the heading estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadEstParams {
    /// Identity register values of the devices which are known to work.
    pub accepted_identities: Vec<u8>,

    /// Number of stationary samples averaged during calibration.
    pub num_calib_samples: usize,

    /// Time between two calibration samples.
    ///
    /// Units: milliseconds
    pub calib_sample_period_ms: u32,

    /// Minimum time between two integration steps. Updates arriving sooner are ignored.
    ///
    /// Units: seconds
    pub min_sample_interval_s: f64,

    /// Time to wait after a device reset before configuring the device again.
    ///
    /// Units: milliseconds
    pub reset_settle_ms: u32,

    /// Number of raw samples reported by the `gyro_test` diagnostic.
    pub num_test_samples: usize,

    /// Time between two `gyro_test` samples.
    ///
    /// Units: milliseconds
    pub test_sample_period_ms: u32,
}

impl Default for HeadEstParams {
    fn default() -> Self {
        Self {
            accepted_identities: vec![0x70, 0x68],
            num_calib_samples: 500,
            calib_sample_period_ms: 2,
            min_sample_interval_s: 0.010,
            reset_settle_ms: 100,
            num_test_samples: 10,
            test_sample_period_ms: 200,
        }
    }
}
