//! # Arm script interpreter module
//!
//! This module provides an interpreter for arm scripts, allowing telecommands to be executed at
//! set times from the start of the session.
//!
//! A script is a sequence of `<time_s>: <tc_json>;` entries, for example:
//!
//! ```text
//! 0.5: {"type": "ARM", "payload": {"Pose": {"x_m": 1.0, "y_m": 0.0, "z_m": 1.0}}};
//! 3.0: {"type": "SAFE"};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Matches one `<time>: <payload>;` entry per line.
const ENTRY_PATTERN: &str = r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_tcs` to
/// acquire a list of telecommands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

#[derive(Debug)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let re = RegexBuilder::new(ENTRY_PATTERN)
            .multi_line(true)
            .build()
            .map_err(|e| ScriptError::InvalidTimestamp(e.to_string()))?;

        let mut cmds: VecDeque<Command> = VecDeque::new();

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or_default();

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // The scripts contain JSON only.
            let tc = Tc::from_json(payload).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            cmds.push_back(Command { exec_time_s, tc });
        }

        if cmds.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { cmds })
    }

    /// Return the TCs that are due at the current session time.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return the TCs that are due at the given time.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s >= current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::arm_ctrl::ArmCmd;

    const SCRIPT: &str = r#"
        0.5: {"type": "UNSAFE"};
        1.0: {"type": "ARM", "payload": {"Pose": {"x_m": 1.0, "y_m": 0.0, "z_m": 1.0}}};
        1.0: {"type": "ARM", "payload": "Stop"};
        4.0: {"type": "SAFE"};
    "#;

    #[test]
    fn test_pending() {
        let mut si = ScriptInterpreter::from_script(SCRIPT).unwrap();
        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 4.0);

        assert!(matches!(si.get_pending_tcs_at(0.1), PendingTcs::None));

        match si.get_pending_tcs_at(1.5) {
            PendingTcs::Some(tcs) => {
                assert_eq!(tcs.len(), 3);
                assert_eq!(tcs[0], Tc::MakeUnsafe);
                assert_eq!(tcs[2], Tc::Arm(ArmCmd::Stop));
            }
            p => panic!("Expected pending TCs, got {:?}", p),
        }

        assert!(matches!(si.get_pending_tcs_at(5.0), PendingTcs::Some(_)));
        assert!(matches!(si.get_pending_tcs_at(6.0), PendingTcs::EndOfScript));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script("nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script(r#"1.0: {"type": "JUMP"};"#),
            Err(ScriptError::InvalidTc(t, _)) if t == 1.0
        ));
        assert!(matches!(
            ScriptInterpreter::new("no/such/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
