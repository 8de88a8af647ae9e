//! # Data Store

use comms_if::eqpt::mech::{MechDems, MechSensData};
use log::{info, warn};
use nalgebra::Point3;
use serde::Serialize;

use crate::arm_ctrl;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the arm has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    TcSourceClosed,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A goal and measured end effector position recorded during the run.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// Session time of the measurement.
    pub time_s: f64,

    /// Position the arm is being driven to, if there is one.
    pub goal_m: Option<[f64; 3]>,

    /// Measured end effector position.
    pub measured_m: [f64; 3],
}

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub sim_time_s: f64,

    // Safe mode variables
    /// Determines if the arm is in safe mode.
    pub safe: bool,

    /// Gives the reason for the arm being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // ArmCtrl
    pub arm_ctrl: arm_ctrl::ArmCtrl,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: MechDems,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // Arm sensing
    /// Latest measurement from the arm.
    pub arm_sens: Option<MechSensData>,

    /// End effector position the arm is being driven to.
    pub goal_m: Option<Point3<f64>>,

    /// Goal and measured positions over the run.
    pub markers: Vec<Marker>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the arm into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.arm_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if cause == root_cause => {
                self.safe = false;
                self.safe_cause = None;
                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
            Some(_) => Err(()),
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.arm_ctrl_input = arm_ctrl::InputData::default();
        self.arm_ctrl_status_rpt = arm_ctrl::StatusReport::default();

        self.sim_time_s = util::session::get_elapsed_seconds();
    }

    /// Record the latest measurement against the current goal.
    ///
    /// Returns the distance between the two, if there is a goal.
    pub fn record_marker(&mut self) -> Option<f64> {
        let sens = self.arm_sens.as_ref()?;
        let goal_m = self.goal_m.map(|g| [g.x, g.y, g.z]);

        self.markers.push(Marker {
            time_s: self.sim_time_s,
            goal_m,
            measured_m: sens.ee_pos_m,
        });

        goal_m.and_then(|g| util::maths::norm(&g, &sens.ee_pos_m))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_mode_causes() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::TcSourceClosed);
        assert!(ds.safe);

        // A later cause doesn't replace the root cause
        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::TcSourceClosed));

        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err());
        assert!(ds.safe);

        assert!(ds.make_unsafe(SafeModeCause::TcSourceClosed).is_ok());
        assert!(!ds.safe);
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }

    #[test]
    fn test_record_marker() {
        let mut ds = DataStore::default();
        assert_eq!(ds.record_marker(), None);

        ds.arm_sens = Some(MechSensData {
            ee_pos_m: [1.0, 0.0, 1.0],
            ..Default::default()
        });
        assert_eq!(ds.record_marker(), None);

        ds.goal_m = Some(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(ds.record_marker(), Some(1.0));

        assert_eq!(ds.markers.len(), 2);
        assert_eq!(ds.markers[0].goal_m, None);
        assert_eq!(ds.markers[1].goal_m, Some([1.0, 0.0, 0.0]));
    }
}
