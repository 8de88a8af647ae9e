//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the arm software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Command and response definitions for equipment (like mechanisms)
pub mod eqpt;
