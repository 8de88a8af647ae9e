//! Analytic inverse kinematics for the three joint arm
//!
//! The arm has a vertical base joint followed by two coplanar unit length links. For a target
//! `(px, py, pz)` the base joint can face the target (forward branch) or face away from it
//! (backward branch), and for each of these the planar two link problem has an elbow-positive
//! and an elbow-negative solution. All of these candidates are found in closed form and
//! classified against the joint limits.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod solver;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::fmt;

// Internal
pub use comms_if::tc::arm_ctrl::ConfigLabel;
pub use params::*;
pub use solver::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single joint angle solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IkSolution {
    /// Base angle about the vertical axis.
    ///
    /// Units: radians
    pub theta1_rad: f64,

    /// Shoulder angle, measured from the horizontal plane.
    ///
    /// Units: radians
    pub theta2_rad: f64,

    /// Elbow angle, relative to the shoulder link.
    ///
    /// Units: radians
    pub theta3_rad: f64,

    /// Configuration label, from the signs of `theta2_rad` and `theta3_rad`.
    pub config: ConfigLabel,
}

/// All solutions for one target.
///
/// `unreachable` is raised if either base branch could not reach the target, so it may be set
/// while `valid` still holds solutions from the other branch. Callers wanting to know whether
/// the target can be reached should check whether `valid` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IkResult {
    /// Solutions within the joint limits.
    pub valid: Vec<IkSolution>,

    /// Solutions violating at least one joint limit.
    pub invalid: Vec<IkSolution>,

    /// True if any base branch was outside the workspace.
    pub unreachable: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Which way the base joint faces relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseBranch {
    /// The arm plane contains the target on the positive reach side.
    Forward,

    /// The base is turned by pi and the arm reaches back over itself.
    Backward,
}

/// Sign of the elbow angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElbowSign {
    Positive,
    Negative,
}

/// Outcome of solving a single base branch.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    /// The target is outside the workspace for this branch.
    Unreachable,

    /// One candidate per distinct elbow sign.
    Candidates(Vec<IkSolution>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkSolution {
    /// Build a solution, labelling it from the angles.
    pub fn new(theta1_rad: f64, theta2_rad: f64, theta3_rad: f64) -> Self {
        Self {
            theta1_rad,
            theta2_rad,
            theta3_rad,
            config: ConfigLabel::from_angles(theta2_rad, theta3_rad),
        }
    }

    /// The joint angles in chain order.
    pub fn joints(&self) -> (f64, f64, f64) {
        (self.theta1_rad, self.theta2_rad, self.theta3_rad)
    }
}

impl fmt::Display for IkSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<11} theta1 = {:8.3} deg ({:7.4} rad), theta2 = {:8.3} deg ({:7.4} rad), \
            theta3 = {:8.3} deg ({:7.4} rad)",
            self.config.as_str(),
            self.theta1_rad.to_degrees(),
            self.theta1_rad,
            self.theta2_rad.to_degrees(),
            self.theta2_rad,
            self.theta3_rad.to_degrees(),
            self.theta3_rad,
        )
    }
}

impl IkResult {
    /// The first valid solution carrying `label`, if any.
    pub fn select(&self, label: ConfigLabel) -> Option<&IkSolution> {
        self.valid.iter().find(|s| s.config == label)
    }

    /// All candidates, valid first.
    pub fn candidates(&self) -> impl Iterator<Item = &IkSolution> {
        self.valid.iter().chain(self.invalid.iter())
    }

    /// Total number of candidates found.
    pub fn num_candidates(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

impl BaseBranch {
    pub const ALL: [BaseBranch; 2] = [BaseBranch::Forward, BaseBranch::Backward];

    /// Sign applied to the horizontal reach.
    pub fn sign(&self) -> f64 {
        match self {
            BaseBranch::Forward => 1.0,
            BaseBranch::Backward => -1.0,
        }
    }
}

impl ElbowSign {
    pub const ALL: [ElbowSign; 2] = [ElbowSign::Positive, ElbowSign::Negative];

    pub fn sign(&self) -> f64 {
        match self {
            ElbowSign::Positive => 1.0,
            ElbowSign::Negative => -1.0,
        }
    }
}
