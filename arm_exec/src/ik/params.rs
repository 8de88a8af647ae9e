//! Parameters structure for the IK solver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint limits applied to IK solutions.
///
/// The base joint is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkParams {
    /// Minimum shoulder angle.
    ///
    /// Units: radians
    pub theta2_min_rad: f64,

    /// Maximum shoulder angle.
    ///
    /// Units: radians
    pub theta2_max_rad: f64,

    /// Minimum elbow angle.
    ///
    /// Units: radians
    pub theta3_min_rad: f64,

    /// Maximum elbow angle.
    ///
    /// Units: radians
    pub theta3_max_rad: f64,

    /// If false every candidate is reported as valid.
    pub enforce_joint_limits: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkParams {
    /// True if both limited joints are inside their ranges, bounds included.
    pub fn within_limits(&self, theta2_rad: f64, theta3_rad: f64) -> bool {
        (self.theta2_min_rad..=self.theta2_max_rad).contains(&theta2_rad)
            && (self.theta3_min_rad..=self.theta3_max_rad).contains(&theta3_rad)
    }
}

impl Default for IkParams {
    fn default() -> Self {
        Self {
            theta2_min_rad: -FRAC_PI_4,
            theta2_max_rad: 3.0 * FRAC_PI_4,
            theta3_min_rad: -3.0 * FRAC_PI_4,
            theta3_max_rad: 3.0 * FRAC_PI_4,
            enforce_joint_limits: true,
        }
    }
}
