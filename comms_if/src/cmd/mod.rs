//! # Command module
//!
//! Every command source (serial console, wireless endpoint, command scripts) produces plain text
//! lines. This module turns one line into a [`Cmd`], and provides the [`Response`] which is sent
//! back down the same channel.
//!
//! The grammar is:
//! - A single character is an obstacle-avoidance console command (`z`, `s`, `q`, `d`, `x`, `i`,
//!   `r`).
//! - A motion word (`forward`, `backward`, `left`, `right`, `forward_left`, `forward_right`,
//!   `backward_left`, `backward_right`, `stop`) is a manual motion command.
//! - Anything else is a navigation verb followed by its arguments, see [`NavCmd`].
//!
//! Matching is case-insensitive on the command word only, arguments keep their case.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod response;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use thiserror::Error;

pub use response::{Response, StatusSnapshot};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Verbs understood by [`NavCmd`], used to tell an unknown command apart from a known one with bad
/// arguments.
const NAV_VERBS: [&str; 8] = [
    "set",
    "go",
    "status",
    "calibrate",
    "gyro_test",
    "mpu_debug",
    "mpu_reset",
    "speed_test",
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command received on any of the command channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cmd {
    /// Stop all motion and leave autonomous navigation. Always accepted.
    Stop,

    /// An obstacle-avoidance (manual) command.
    Manual(ManualCmd),

    /// A navigation verb.
    Nav(NavCmd),
}

/// Manual commands, issued either as console characters or as motion words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualCmd {
    Forward,
    Backward,
    Left,
    Right,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,

    /// Report the last measured distance and the current fix.
    Info,

    /// Sweep the rangefinder from right to left and report each reading.
    Sweep,
}

/// Side of the rover, used for lateral clearance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Navigation and diagnostic verbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
pub enum NavCmd {
    /// Set the destination waypoint, given as `D°M'S"H,D°M'S"H` (latitude, longitude).
    #[structopt(name = "set")]
    Set {
        /// The coordinate pair. It may be split over several words, they are joined back
        /// together without separators.
        #[structopt(required = true)]
        coords: Vec<String>,
    },

    /// Start autonomous navigation towards the waypoint.
    #[structopt(name = "go")]
    Go,

    /// Report a status snapshot.
    #[structopt(name = "status")]
    Status,

    /// Recalibrate the gyro bias. The rover must be stationary.
    #[structopt(name = "calibrate")]
    Calibrate,

    /// Print a handful of raw gyro samples.
    #[structopt(name = "gyro_test")]
    GyroTest,

    /// Print the heading estimator's internal state.
    #[structopt(name = "mpu_debug")]
    GyroDebug,

    /// Reset the gyro and re-run its initialisation.
    #[structopt(name = "mpu_reset")]
    GyroReset,

    /// Print the turn speed used for a range of heading errors.
    #[structopt(name = "speed_test")]
    SpeedTest,
}

/// Errors which can occur while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CmdParseError {
    #[error("Empty command")]
    Empty,

    #[error("Command not recognised: {0}")]
    NotRecognised(String),

    #[error("Invalid arguments for {0}: {1}")]
    InvalidArgs(String, String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Cmd {
    /// Parse a single command line.
    ///
    /// Surrounding whitespace (including the line terminator) is ignored.
    pub fn parse(line: &str) -> Result<Self, CmdParseError> {
        let line = line.trim();

        if line.is_empty() {
            return Err(CmdParseError::Empty)
        }

        // Console characters
        let mut chars = line.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c.to_ascii_lowercase() {
                'z' => Ok(Cmd::Manual(ManualCmd::Forward)),
                's' => Ok(Cmd::Manual(ManualCmd::Backward)),
                'q' => Ok(Cmd::Manual(ManualCmd::Left)),
                'd' => Ok(Cmd::Manual(ManualCmd::Right)),
                'x' => Ok(Cmd::Stop),
                'i' => Ok(Cmd::Manual(ManualCmd::Info)),
                'r' => Ok(Cmd::Manual(ManualCmd::Sweep)),
                _ => Err(CmdParseError::NotRecognised(line.to_string()))
            }
        }

        let mut words = line.split_whitespace();

        let verb = match words.next() {
            Some(w) => w.to_lowercase(),
            None => return Err(CmdParseError::Empty)
        };
        let args: Vec<&str> = words.collect();

        // Motion words take no arguments
        if args.is_empty() {
            if verb == "stop" {
                return Ok(Cmd::Stop)
            }
            if let Some(m) = ManualCmd::from_word(&verb) {
                return Ok(Cmd::Manual(m))
            }
        }

        if !NAV_VERBS.contains(&verb.as_str()) {
            return Err(CmdParseError::NotRecognised(line.to_string()))
        }

        let argv = std::iter::once("nav")
            .chain(std::iter::once(verb.as_str()))
            .chain(args.into_iter());

        NavCmd::from_iter_safe(argv)
            .map(Cmd::Nav)
            .map_err(|e| {
                // Clap messages include the usage string, only the first line is of interest
                let msg = e.message.lines().next().unwrap_or("").to_string();
                CmdParseError::InvalidArgs(verb.clone(), msg)
            })
    }
}

impl ManualCmd {
    /// Parse a motion word.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "forward" => Some(ManualCmd::Forward),
            "backward" => Some(ManualCmd::Backward),
            "left" => Some(ManualCmd::Left),
            "right" => Some(ManualCmd::Right),
            "forward_left" => Some(ManualCmd::ForwardLeft),
            "forward_right" => Some(ManualCmd::ForwardRight),
            "backward_left" => Some(ManualCmd::BackwardLeft),
            "backward_right" => Some(ManualCmd::BackwardRight),
            _ => None
        }
    }

    /// True if the command moves the motors.
    pub fn is_motion(&self) -> bool {
        !matches!(self, ManualCmd::Info | ManualCmd::Sweep)
    }

    /// True if the command has a forward component, and is therefore gated by a frontal
    /// obstacle.
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            ManualCmd::Forward | ManualCmd::ForwardLeft | ManualCmd::ForwardRight
        )
    }

    /// The side which must be checked clear before the command may run, if any.
    pub fn lateral_side(&self) -> Option<Side> {
        match self {
            ManualCmd::Left | ManualCmd::ForwardLeft | ManualCmd::BackwardLeft => Some(Side::Left),
            ManualCmd::Right
            | ManualCmd::ForwardRight
            | ManualCmd::BackwardRight => Some(Side::Right),
            _ => None
        }
    }
}

impl std::fmt::Display for ManualCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ManualCmd::Forward => "forward",
            ManualCmd::Backward => "backward",
            ManualCmd::Left => "left",
            ManualCmd::Right => "right",
            ManualCmd::ForwardLeft => "forward_left",
            ManualCmd::ForwardRight => "forward_right",
            ManualCmd::BackwardLeft => "backward_left",
            ManualCmd::BackwardRight => "backward_right",
            ManualCmd::Info => "info",
            ManualCmd::Sweep => "sweep",
        };

        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}
