//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ik::{ConfigLabel, IkParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Configuration used for pose commands which don't request one.
    pub default_config: ConfigLabel,

    /// Joint limits for the IK solver.
    #[serde(default)]
    pub ik: IkParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            default_config: ConfigLabel::PlusMinus,
            ik: IkParams::default(),
        }
    }
}
