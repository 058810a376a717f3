//! # Rover Executable Parameters
//!
//! This module provide parameters for the rover executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::net::SocketOptions;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RovExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive overrunning cycles after which a warning is raised.
    pub max_consec_overruns: u64,

    /// Read command lines from the serial console (stdin).
    pub enable_serial: bool,

    /// Serve commands on the wireless endpoint.
    pub enable_wireless: bool,

    /// Network endpoint for the wireless command server
    pub cmd_endpoint: String,

    /// Socket options for the wireless command server
    #[serde(default)]
    pub cmd_socket: SocketOptions,

    /// Period of the status line written to the log while navigating, zero to disable.
    ///
    /// Units: seconds
    pub status_log_period_s: f64,
}
