//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

#[cfg(feature = "sim")]
use crate::sim_arm::SimArmParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmExecParams {
    /// Target period of one cycle of the main loop
    pub cycle_period_s: f64,

    /// Path of the prompt history file, relative to the software root
    pub history_path: String,

    /// Settings of the simulated arm
    #[cfg(feature = "sim")]
    #[serde(default)]
    pub sim: SimArmParams,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let p: ArmExecParams = toml::from_str(
            r#"
            cycle_period_s = 0.1
            history_path = "sessions/history.txt"

            [sim]
            period_s = 0.02
            max_rate_rads = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(p.cycle_period_s, 0.1);
        #[cfg(feature = "sim")]
        assert_eq!(p.sim.max_rate_rads, 2.0);
    }
}
