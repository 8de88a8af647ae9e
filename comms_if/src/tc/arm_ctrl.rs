//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use structopt::{clap::AppSettings, StructOpt};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be completed by arm control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, StructOpt)]
pub enum ArmCmd {
    /// Move the end effector to a position in the arm base frame.
    ///
    /// Joint angles are found by the inverse kinematics, choosing the solution with the given
    /// elbow configuration.
    #[structopt(name = "pose", setting = AppSettings::AllowNegativeNumbers)]
    Pose {
        /// Target x coordinate in meters.
        x_m: f64,

        /// Target y coordinate in meters.
        y_m: f64,

        /// Target z coordinate in meters, positive upwards along the base axis.
        z_m: f64,

        /// Configuration to select, one of plus-plus, plus-minus, minus-plus or minus-minus.
        ///
        /// If not given the configured default is used.
        #[structopt(long)]
        #[serde(default)]
        config: Option<ConfigLabel>,
    },

    /// Move each joint directly to the given angle.
    #[structopt(name = "joints", setting = AppSettings::AllowNegativeNumbers)]
    Joints {
        /// Base angle in radians, about the vertical axis.
        base_rad: f64,

        /// Shoulder angle in radians.
        shoulder_rad: f64,

        /// Elbow angle in radians, relative to the shoulder link.
        elbow_rad: f64,
    },

    /// Stop the arm, maintaining the current target.
    #[structopt(name = "stop")]
    Stop,
}

/// Elbow configuration of an IK solution, named by the signs of the shoulder and elbow angles.
///
/// A strictly positive angle is "plus", zero or negative is "minus".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigLabel {
    PlusPlus,
    PlusMinus,
    MinusPlus,
    MinusMinus,
}

/// Error parsing a configuration label.
#[derive(Debug, Error, PartialEq)]
#[error(
    "\"{0}\" is not a configuration, expected one of plus-plus, plus-minus, minus-plus or \
    minus-minus"
)]
pub struct ConfigLabelParseError(String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ConfigLabel {
    /// All labels.
    pub const ALL: [ConfigLabel; 4] = [
        ConfigLabel::PlusPlus,
        ConfigLabel::PlusMinus,
        ConfigLabel::MinusPlus,
        ConfigLabel::MinusMinus,
    ];

    /// Label for the given shoulder and elbow angles.
    pub fn from_angles(theta2_rad: f64, theta3_rad: f64) -> Self {
        match (theta2_rad > 0.0, theta3_rad > 0.0) {
            (true, true) => ConfigLabel::PlusPlus,
            (true, false) => ConfigLabel::PlusMinus,
            (false, true) => ConfigLabel::MinusPlus,
            (false, false) => ConfigLabel::MinusMinus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLabel::PlusPlus => "plus-plus",
            ConfigLabel::PlusMinus => "plus-minus",
            ConfigLabel::MinusPlus => "minus-plus",
            ConfigLabel::MinusMinus => "minus-minus",
        }
    }
}

impl fmt::Display for ConfigLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigLabel {
    type Err = ConfigLabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigLabel::ALL
            .iter()
            .find(|l| l.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigLabelParseError(s.to_string()))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_label_from_angles() {
        assert_eq!(ConfigLabel::from_angles(0.1, 0.2), ConfigLabel::PlusPlus);
        assert_eq!(ConfigLabel::from_angles(0.1, -0.2), ConfigLabel::PlusMinus);
        assert_eq!(ConfigLabel::from_angles(-0.1, 0.2), ConfigLabel::MinusPlus);
        assert_eq!(ConfigLabel::from_angles(-0.1, -0.2), ConfigLabel::MinusMinus);

        // Zero is minus
        assert_eq!(ConfigLabel::from_angles(0.0, 0.0), ConfigLabel::MinusMinus);
        assert_eq!(ConfigLabel::from_angles(1.0, 0.0), ConfigLabel::PlusMinus);
    }

    #[test]
    fn test_label_names() {
        for l in ConfigLabel::ALL.iter() {
            assert_eq!(l.to_string().parse::<ConfigLabel>(), Ok(*l));
            assert_eq!(
                serde_json::to_string(l).unwrap(),
                format!("\"{}\"", l.as_str())
            );
        }
        assert!("plus".parse::<ConfigLabel>().is_err());
    }

    #[test]
    fn test_parse_cmd() {
        let args = ["arm", "pose", "0.5", "-0.6", "0.7", "--config", "minus-plus"];
        let cmd = ArmCmd::from_iter_safe(&args).unwrap();
        assert_eq!(
            cmd,
            ArmCmd::Pose {
                x_m: 0.5,
                y_m: -0.6,
                z_m: 0.7,
                config: Some(ConfigLabel::MinusPlus)
            }
        );

        let cmd: ArmCmd =
            serde_json::from_str(r#"{"Pose": {"x_m": 1.0, "y_m": 0.0, "z_m": 1.0}}"#).unwrap();
        assert_eq!(
            cmd,
            ArmCmd::Pose {
                x_m: 1.0,
                y_m: 0.0,
                z_m: 1.0,
                config: None
            }
        );
    }
}
