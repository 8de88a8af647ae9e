//! # Mechanisms Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Arm actuators in chain order, base to tip.
const ARM_IDS: [ActId; 3] = [ActId::ArmBase, ActId::ArmShoulder, ActId::ArmElbow];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent to the arm mechanisms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MechDems {
    /// The demanded position of an actuator in radians.
    pub pos_rad: HashMap<ActId, f64>,
}

/// Sensor data returned by the arm mechanisms.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MechSensData {
    /// Measured position of each actuator.
    ///
    /// Units: radians
    pub pos_rad: HashMap<ActId, f64>,

    /// Measured position of the end effector in the arm base frame.
    ///
    /// Units: meters
    pub ee_pos_m: [f64; 3],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators on the arm
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// Rotation about the vertical axis (joint 1)
    ArmBase,

    /// First planar joint (joint 2)
    ArmShoulder,

    /// Second planar joint (joint 3)
    ArmElbow,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ActId {
    /// All arm actuators, base to tip.
    pub fn arm_ids() -> &'static [ActId; 3] {
        &ARM_IDS
    }
}

impl MechDems {
    /// Build position demands for the three arm joints.
    pub fn from_joints(base_rad: f64, shoulder_rad: f64, elbow_rad: f64) -> Self {
        let mut dems = Self::default();

        dems.pos_rad.insert(ActId::ArmBase, base_rad);
        dems.pos_rad.insert(ActId::ArmShoulder, shoulder_rad);
        dems.pos_rad.insert(ActId::ArmElbow, elbow_rad);

        dems
    }

    /// The demanded joint positions in chain order, or `None` if any joint is missing.
    pub fn joints(&self) -> Option<(f64, f64, f64)> {
        Some((
            *self.pos_rad.get(&ActId::ArmBase)?,
            *self.pos_rad.get(&ActId::ArmShoulder)?,
            *self.pos_rad.get(&ActId::ArmElbow)?,
        ))
    }
}

impl Default for MechDems {
    fn default() -> Self {
        let mut pos_rad = HashMap::new();

        for id in ARM_IDS.iter() {
            pos_rad.insert(*id, 0.0);
        }

        Self { pos_rad }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joints() {
        assert_eq!(MechDems::default().joints(), Some((0.0, 0.0, 0.0)));
        assert_eq!(
            MechDems::from_joints(0.1, -0.2, 0.3).joints(),
            Some((0.1, -0.2, 0.3))
        );

        let mut dems = MechDems::default();
        dems.pos_rad.remove(&ActId::ArmShoulder);
        assert_eq!(dems.joints(), None);
    }

    #[test]
    fn test_json() {
        let dems: MechDems =
            serde_json::from_str(r#"{"pos_rad": {"ArmBase": 1.0, "ArmElbow": 0.5}}"#).unwrap();

        assert_eq!(dems.pos_rad[&ActId::ArmBase], 1.0);
        assert_eq!(dems.joints(), None);
    }
}
