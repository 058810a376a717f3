//! # Command responses

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Flat snapshot of the rover's state, reported by the `status` verb.
///
/// Serialised as a single JSON object. Coordinates are only present while the fix is valid and
/// the heading only while the gyro is healthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Last valid distance measured straight ahead.
    pub distance_cm: f64,

    pub obstacle: bool,

    pub gps_valid: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub longitude: Option<f64>,

    pub gyro_ok: bool,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub heading_deg: Option<f64>,

    pub navigating: bool,

    /// Name of the current navigation mode.
    pub mode: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The response to a single command, written back as one or more text lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Command accepted.
    Ok,

    /// Command accepted, with a message for the operator.
    Done(String),

    /// Command understood but refused for safety reasons.
    Blocked(String),

    /// Command understood but invalid in the current state or with the given arguments.
    Rejected(String),

    /// Command not understood.
    NotRecognised(String),

    /// Status snapshot.
    Status(StatusSnapshot),

    /// Multi-line report, for diagnostics.
    Text(Vec<String>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok | Response::Done(_))
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Response::Blocked(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Response::Rejected(_))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Ok => write!(f, "OK"),
            Response::Done(m) => write!(f, "OK: {}", m),
            Response::Blocked(m) => write!(f, "BLOCKED: {}", m),
            Response::Rejected(m) => write!(f, "ERROR: {}", m),
            Response::NotRecognised(m) => write!(f, "NOT RECOGNISED: {}", m),
            Response::Status(s) => {
                let json = serde_json::to_string(s).map_err(|_| std::fmt::Error)?;
                write!(f, "{}", json)
            },
            Response::Text(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}
