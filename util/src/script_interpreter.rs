//! # Rover command script interpreter
//!
//! Command scripts are text files of timed command lines, each of the form
//!
//! ```text
//! <time_s>: <command>;
//! ```
//!
//! where `<command>` is any line accepted by the command channel. Lines not matching this form
//! (comments, blank lines) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::cmd::{Cmd, CmdParseError};
use crate::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct ScriptedCmd {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: Cmd
}

/// A script interpreter.
///
/// After loading a script use `.get_pending_cmds` to acquire the commands that need executing.
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    cmds: VecDeque<ScriptedCmd>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, CmdParseError),

    #[error("Could not build the script regex: {0}")]
    RegexError(regex::Error)
}

pub enum PendingCmds {
    None,
    Some(Vec<Cmd>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());
        
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_text(&script)?;
        interp.script_path = Some(path);

        Ok(interp)
    }

    /// Create a new interpreter from the text of a script.
    pub fn from_text(script: &str) -> Result<Self, ScriptError> {
        let mut cmd_queue: VecDeque<ScriptedCmd> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::RegexError)?;

        for cap in re.captures_iter(script) {
            let (time_str, cmd_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(c)) => (t.as_str(), c.as_str()),
                _ => continue
            };

            let exec_time_s: f64 = time_str.parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            let cmd = Cmd::parse(cmd_str)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(ScriptedCmd {
                exec_time_s,
                cmd
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: cmd_queue
        })
    }

    /// Return the commands due by the current session time.
    pub fn get_pending_cmds(&mut self) -> PendingCmds {
        self.get_pending_cmds_at(get_elapsed_seconds())
    }

    /// Return the commands due by `current_time_s`.
    pub fn get_pending_cmds_at(&mut self, current_time_s: f64) -> PendingCmds {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        // No session time, nothing can be due yet
        if current_time_s.is_nan() {
            return PendingCmds::None
        }

        let mut cmd_vec: Vec<Cmd> = vec![];

        // Pop commands off the front of the queue until the head's exec time
        // is in the future.
        while let Some(head) = self.cmds.front() {
            if head.exec_time_s >= current_time_s {
                break
            }

            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.cmd);
            }
        }

        if cmd_vec.is_empty() {
            PendingCmds::None
        }
        else {
            PendingCmds::Some(cmd_vec)
        }
    }

    /// Path the script was loaded from, if it was loaded from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}
