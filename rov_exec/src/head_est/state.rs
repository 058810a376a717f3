//! Implementations for the HeadEst state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use embedded_hal::blocking::delay::DelayMs;
use log::{debug, info, trace, warn};

// Internal
use super::{HeadEstError, HeadEstMode, HeadEstParams};
use comms_if::eqpt::{ImuError, RateGyro};
use util::{maths::norm_angle_deg, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading estimator state.
pub struct HeadEst<G, D> {
    params: HeadEstParams,

    gyro: G,

    delay: D,

    mode: HeadEstMode,

    /// Identity read during the last initialisation, if the device answered.
    identity: Option<u8>,

    /// Current heading.
    ///
    /// Units: degrees, in `[0, 360)`
    heading_deg: f64,

    /// Rate read while stationary during calibration, subtracted from every sample.
    ///
    /// Units: degrees/second
    bias_dps: f64,

    /// Bias-corrected rate of the last integration step.
    ///
    /// Units: degrees/second
    last_rate_dps: f64,

    /// Time of the last integration step, `None` until the first update after calibration.
    last_sample_time_s: Option<f64>,
}

/// Output of one estimator cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingOutput {
    /// Units: degrees, in `[0, 360)`
    pub heading_deg: f64,

    pub healthy: bool,
}

/// Status report for one estimator cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadEstStatusReport {
    /// True if a new sample was integrated this cycle.
    pub integrated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<G, D> HeadEst<G, D>
where
    G: RateGyro,
    D: DelayMs<u32>
{
    pub fn new(params: HeadEstParams, gyro: G, delay: D) -> Self {
        Self {
            params,
            gyro,
            delay,
            mode: HeadEstMode::Uninitialised,
            identity: None,
            heading_deg: 0.0,
            bias_dps: 0.0,
            last_rate_dps: 0.0,
            last_sample_time_s: None,
        }
    }

    /// Handshake with the device, check its identity, configure it and calibrate.
    ///
    /// On any failure the estimator ends up `Faulted` and the heading is no longer usable.
    pub fn start(&mut self) -> Result<(), HeadEstError> {
        self.mode = HeadEstMode::Uninitialised;
        self.identity = None;

        let result = self.handshake().and_then(|_| self.calibrate());

        if let Err(ref e) = result {
            warn!("HeadEst faulted: {}", e);
            self.mode = HeadEstMode::Faulted;
        }

        result
    }

    /// Recalibrate the rate bias and reset the heading to zero.
    ///
    /// The rover must be stationary. Only valid once the device has been brought up, i.e. not
    /// from `Uninitialised` nor `Faulted`.
    ///
    /// If a read fails while recalibrating a tracking estimator, it goes back to tracking with
    /// the previous bias. A failure during bring-up leaves it `Faulted`.
    pub fn calibrate(&mut self) -> Result<(), HeadEstError> {
        if self.identity.is_none() || self.mode == HeadEstMode::Faulted {
            return Err(HeadEstError::NotTracking(self.mode))
        }

        let was_tracking = self.mode == HeadEstMode::Tracking;

        self.mode = HeadEstMode::Calibrating;
        info!(
            "Calibrating gyro bias over {} samples, do not move the rover",
            self.params.num_calib_samples
        );

        let num_samples = self.params.num_calib_samples.max(1);
        let mut sum_dps = 0.0;

        for _ in 0..num_samples {
            let rate = match self.gyro.read_rate_z_dps() {
                Ok(r) => r,
                Err(e) => {
                    warn!("Gyro read failed during calibration: {}", e);
                    if was_tracking {
                        // Restart the integration clock, the calibration time is not integrated
                        self.last_sample_time_s = None;
                        self.mode = HeadEstMode::Tracking;
                    }
                    else {
                        self.mode = HeadEstMode::Faulted;
                    }
                    return Err(HeadEstError::CalibrationFailed(e))
                }
            };
            sum_dps += rate;
            self.delay.delay_ms(self.params.calib_sample_period_ms);
        }

        self.bias_dps = sum_dps / num_samples as f64;
        self.heading_deg = 0.0;
        self.last_rate_dps = 0.0;
        self.last_sample_time_s = None;
        self.mode = HeadEstMode::Tracking;

        info!("Gyro calibrated, bias {:.3} deg/s", self.bias_dps);

        Ok(())
    }

    /// Reset the device then bring it up again. This is the only way out of `Faulted`.
    pub fn reset(&mut self) -> Result<(), HeadEstError> {
        info!("Resetting gyro");

        if let Err(e) = self.gyro.reset() {
            warn!("Gyro reset failed: {}", e);
            self.mode = HeadEstMode::Faulted;
            return Err(HeadEstError::ResetFailed(e))
        }

        self.delay.delay_ms(self.params.reset_settle_ms);

        self.start()
    }

    /// Integrate one rate sample if at least the minimum interval has passed since the last one.
    ///
    /// Returns `Ok(true)` if a sample was integrated. Does nothing unless tracking.
    pub fn update(&mut self, time_s: f64) -> Result<bool, HeadEstError> {
        if self.mode != HeadEstMode::Tracking || !time_s.is_finite() {
            return Ok(false)
        }

        let last_time_s = match self.last_sample_time_s {
            Some(t) => t,
            None => {
                // First sample after calibration only starts the clock
                self.last_sample_time_s = Some(time_s);
                return Ok(false)
            }
        };

        let dt = time_s - last_time_s;
        if dt < self.params.min_sample_interval_s {
            return Ok(false)
        }

        let rate_dps = self.gyro.read_rate_z_dps()
            .map_err(HeadEstError::ReadFailed)? - self.bias_dps;

        self.heading_deg = norm_angle_deg(self.heading_deg + rate_dps * dt);
        self.last_rate_dps = rate_dps;
        self.last_sample_time_s = Some(time_s);

        trace!(
            "HeadEst: rate {:.3} deg/s, dt {:.4} s, heading {:.2} deg",
            rate_dps, dt, self.heading_deg
        );

        Ok(true)
    }

    /// Read raw samples for the `gyro_test` diagnostic, each followed by the test sample
    /// period.
    ///
    /// Works in any mode, the estimator state is not modified.
    pub fn sample_raw(&mut self) -> Vec<Result<f64, ImuError>> {
        let mut samples = Vec::with_capacity(self.params.num_test_samples);

        for _ in 0..self.params.num_test_samples {
            samples.push(self.gyro.read_rate_z_dps());
            self.delay.delay_ms(self.params.test_sample_period_ms);
        }

        samples
    }

    /// Human readable dump of the estimator's internal state, for the `mpu_debug` diagnostic.
    pub fn debug_lines(&mut self) -> Vec<String> {
        let identity = self.gyro.identify();

        let id_line = match identity {
            Ok(id) => format!(
                "identity: 0x{:02X} ({})",
                id,
                if self.params.accepted_identities.contains(&id) { "accepted" } else { "unknown" }
            ),
            Err(e) => format!("identity: no response ({})", e)
        };

        vec![
            id_line,
            format!("mode: {}", self.mode),
            format!("healthy: {}", self.is_healthy()),
            format!("bias: {:.3} deg/s", self.bias_dps),
            format!("heading: {:.1} deg", self.heading_deg),
            format!("rate: {:.2} deg/s", self.last_rate_dps),
        ]
    }

    /// True if the heading can be used for navigation.
    pub fn is_healthy(&self) -> bool {
        self.mode == HeadEstMode::Tracking
    }

    /// Current heading, or the last one if the estimator is no longer tracking.
    ///
    /// Units: degrees, in `[0, 360)`
    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn mode(&self) -> HeadEstMode {
        self.mode
    }

    pub fn bias_dps(&self) -> f64 {
        self.bias_dps
    }

    /// Force the heading, used by tests to start from a known orientation.
    #[cfg(test)]
    pub(crate) fn set_heading_deg(&mut self, heading_deg: f64) {
        self.heading_deg = norm_angle_deg(heading_deg);
    }

    fn handshake(&mut self) -> Result<(), HeadEstError> {
        let id = self.gyro.identify().map_err(HeadEstError::NoResponse)?;
        self.identity = Some(id);

        debug!("Gyro identity 0x{:02X}", id);

        if !self.params.accepted_identities.contains(&id) {
            return Err(HeadEstError::UnexpectedIdentity(id))
        }

        self.gyro.configure().map_err(HeadEstError::ConfigureFailed)
    }
}

impl<G, D> State for HeadEst<G, D>
where
    G: RateGyro,
    D: DelayMs<u32>
{
    type InitData = ();
    type InitError = HeadEstError;

    type InputData = f64;
    type OutputData = HeadingOutput;
    type StatusReport = HeadEstStatusReport;
    type ProcError = HeadEstError;

    /// Bring the device up. The estimator remains usable (faulted) on error.
    fn init(&mut self, _init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.start()
    }

    /// Integrate the gyro at the given session time.
    fn proc(&mut self, time_s: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let integrated = self.update(*time_s)?;

        Ok((
            HeadingOutput {
                heading_deg: self.heading_deg,
                healthy: self.is_healthy()
            },
            HeadEstStatusReport { integrated }
        ))
    }
}
