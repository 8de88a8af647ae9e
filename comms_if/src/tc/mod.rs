//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use thiserror::Error;

// Internal
use arm_ctrl::ArmCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by an operator or a script.
///
/// Serialised as `{"type": "ARM", "payload": ...}`, the payload being omitted for types which
/// don't have one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Put the arm into safe mode, stopping any motion.
    #[serde(rename = "SAFE")]
    #[structopt(name = "safe")]
    MakeSafe,

    /// Leave safe mode.
    #[serde(rename = "UNSAFE")]
    #[structopt(name = "unsafe")]
    MakeUnsafe,

    /// Command for arm control.
    #[serde(rename = "ARM")]
    #[structopt(name = "arm")]
    Arm(ArmCmd),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC is not valid: {0}")]
    InvalidCommand(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Parse a TC from a command line, such as `arm pose 1 0 1`.
    pub fn from_line(line: &str) -> Result<Self, TcParseError> {
        let args = std::iter::once("tc").chain(line.split_whitespace());

        Tc::from_iter_safe(args).map_err(|e| TcParseError::InvalidCommand(e.message))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::tc::arm_ctrl::ConfigLabel;

    #[test]
    fn test_from_json() {
        assert_eq!(Tc::from_json(r#"{"type": "SAFE"}"#).unwrap(), Tc::MakeSafe);
        assert_eq!(Tc::from_json(r#"{"type": "UNSAFE"}"#).unwrap(), Tc::MakeUnsafe);
        assert_eq!(
            Tc::from_json(r#"{"type": "ARM", "payload": "Stop"}"#).unwrap(),
            Tc::Arm(ArmCmd::Stop)
        );
        assert_eq!(
            Tc::from_json(
                r#"{"type": "ARM", "payload": {"Joints": {
                    "base_rad": 0.1, "shoulder_rad": 0.2, "elbow_rad": -0.3
                }}}"#
            )
            .unwrap(),
            Tc::Arm(ArmCmd::Joints {
                base_rad: 0.1,
                shoulder_rad: 0.2,
                elbow_rad: -0.3
            })
        );

        assert!(matches!(
            Tc::from_json(r#"{"type": "MNVR"}"#),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "ARM"}"#),
            Err(TcParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_from_line() {
        assert_eq!(Tc::from_line("safe").unwrap(), Tc::MakeSafe);
        assert_eq!(
            Tc::from_line("arm pose 1 0 1.5 --config plus-plus").unwrap(),
            Tc::Arm(ArmCmd::Pose {
                x_m: 1.0,
                y_m: 0.0,
                z_m: 1.5,
                config: Some(ConfigLabel::PlusPlus)
            })
        );
        assert!(matches!(
            Tc::from_line("arm pose 1 0"),
            Err(TcParseError::InvalidCommand(_))
        ));
        assert!(Tc::from_line("jump").is_err());
    }
}
