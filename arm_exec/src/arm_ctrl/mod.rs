//! Arm control module
//!
//! Turns arm commands into joint demands, using the IK solver for position targets.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point3;

// Internal
use crate::ik::ConfigLabel;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ArmCtrlError {
    #[error("No valid joint solution for target {target_m} (unreachable = {unreachable})")]
    NoSolution {
        target_m: Point3<f64>,
        unreachable: bool,
    },

    #[error("No valid {0} solution for target {1}")]
    NoMatchingConfig(ConfigLabel, Point3<f64>),
}
