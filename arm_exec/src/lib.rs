//! # Arm library.
//!
//! This library allows other crates in the workspace, and the arm executables, to access the
//! arm kinematics.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - converts arm commands into joint demands
pub mod arm_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Denavit-Hartenberg chain builder - symbolic link and compound transforms
pub mod dh_chain;

/// Forward kinematics - the arm's end effector pose from its joint angles
pub mod fwd_kin;

/// Inverse kinematics - closed form joint solutions for an end effector position
pub mod ik;

/// Executable parameters
pub mod params;

/// Simulated arm - tracks joint demands and measures the end effector
#[cfg(feature = "sim")]
pub mod sim_arm;

/// Interactive telecommand source
pub mod tc_prompt;
