//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

// Internal
use super::{ArmCtrlError, Params};
use crate::ik::{ConfigLabel, IkSolver};
use comms_if::{eqpt::mech::MechDems, tc::arm_ctrl::ArmCmd};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    solver: IkSolver,

    report: StatusReport,

    current_cmd: Option<ArmCmd>,

    target: Option<MechDems>,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The command to be executed, or `None` if there is no new command on this cycle.
    pub cmd: Option<ArmCmd>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusReport {
    /// True if a base branch could not reach the last pose target.
    pub unreachable: bool,

    /// Number of solutions within the joint limits for the last pose target.
    pub num_valid: usize,

    /// Number of solutions outside the joint limits for the last pose target.
    pub num_invalid: usize,

    /// Configuration chosen for the last pose target.
    pub selected: Option<ConfigLabel>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = MechDems;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        *self = Self::with_params(params::load(init_data)?);

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = &input_data.cmd {
            self.current_cmd = Some(*cmd);

            debug!("New ArmCtrl ArmCmd::{:?}", cmd);

            self.calc_target(cmd)?;
        }

        Ok((self.output(), self.report))
    }
}

impl ArmCtrl {
    /// Create the module directly from parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            solver: IkSolver::new(params.ik),
            params,
            ..Default::default()
        }
    }

    /// Function called when entering safe mode.
    ///
    /// Issues `Stop`, holding the current target. Demands for that target are still output, so
    /// an arm still moving towards it will finish the move.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(ArmCmd::Stop);
        debug!("ArmCtrl made safe, holding {:?}", self.target);
    }

    /// The current joint target, if one has been set.
    pub fn target(&self) -> Option<&MechDems> {
        self.target.as_ref()
    }

    /// The last command received.
    pub fn current_cmd(&self) -> Option<&ArmCmd> {
        self.current_cmd.as_ref()
    }

    /// Demands to send this cycle: the current target, or the zero position if there is none.
    fn output(&self) -> MechDems {
        match self.target {
            Some(ref t) => t.clone(),
            None => MechDems::default(),
        }
    }

    /// Calculate a new target from the command.
    ///
    /// On error the previous target is kept.
    fn calc_target(&mut self, cmd: &ArmCmd) -> Result<(), ArmCtrlError> {
        match cmd {
            ArmCmd::Pose {
                x_m,
                y_m,
                z_m,
                config,
            } => {
                let target_m = Point3::new(*x_m, *y_m, *z_m);
                let config = config.unwrap_or(self.params.default_config);
                self.calc_pose(target_m, config)
            }
            ArmCmd::Joints {
                base_rad,
                shoulder_rad,
                elbow_rad,
            } => {
                self.target = Some(MechDems::from_joints(*base_rad, *shoulder_rad, *elbow_rad));
                Ok(())
            }
            // Keep whatever target we already have
            ArmCmd::Stop => Ok(()),
        }
    }

    /// Solve the IK for a target position and select the requested configuration.
    fn calc_pose(
        &mut self,
        target_m: Point3<f64>,
        config: ConfigLabel,
    ) -> Result<(), ArmCtrlError> {
        let result = self.solver.solve(&target_m);

        self.report.unreachable = result.unreachable;
        self.report.num_valid = result.valid.len();
        self.report.num_invalid = result.invalid.len();

        if result.valid.is_empty() {
            if result.unreachable && result.invalid.is_empty() {
                warn!("Target {} is outside the arm workspace", target_m);
            } else {
                warn!(
                    "All {} solutions for target {} violate the joint limits",
                    result.invalid.len(),
                    target_m
                );
            }
            return Err(ArmCtrlError::NoSolution {
                target_m,
                unreachable: result.unreachable,
            });
        }

        let solution = result
            .select(config)
            .ok_or(ArmCtrlError::NoMatchingConfig(config, target_m))?;

        debug!("Selected {}", solution);

        self.report.selected = Some(config);
        self.target = Some(MechDems::from_joints(
            solution.theta1_rad,
            solution.theta2_rad,
            solution.theta3_rad,
        ));

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pose(x_m: f64, y_m: f64, z_m: f64, config: Option<ConfigLabel>) -> InputData {
        InputData {
            cmd: Some(ArmCmd::Pose {
                x_m,
                y_m,
                z_m,
                config,
            }),
        }
    }

    #[test]
    fn test_pose_cmd() {
        let mut arm = ArmCtrl::with_params(Params::default());

        let (dems, report) = arm
            .proc(&pose(0.5, 0.6, 0.7, Some(ConfigLabel::PlusPlus)))
            .unwrap();

        assert_eq!(report.selected, Some(ConfigLabel::PlusPlus));
        assert_eq!(report.num_valid + report.num_invalid, 4);
        assert!(!report.unreachable);

        let (t1, t2, t3) = dems.joints().unwrap();
        assert!(t2 > 0.0 && t3 > 0.0);
        assert_abs_diff_eq!(t1, 0.6f64.atan2(0.5) - std::f64::consts::PI, epsilon = 1e-12);

        // Default configuration is used when none is given
        let (_, report) = arm.proc(&pose(0.5, 0.6, 0.7, None)).unwrap();
        assert_eq!(report.selected, Some(ConfigLabel::PlusMinus));

        // With no new command the output holds
        let (held, _) = arm.proc(&InputData::default()).unwrap();
        assert_eq!(Some(&held), arm.target());
    }

    #[test]
    fn test_unreachable_pose() {
        let mut arm = ArmCtrl::with_params(Params::default());
        arm.proc(&InputData {
            cmd: Some(ArmCmd::Joints {
                base_rad: 0.1,
                shoulder_rad: 0.2,
                elbow_rad: 0.3,
            }),
        })
        .unwrap();

        let err = arm.proc(&pose(3.0, 0.0, 3.0, None)).unwrap_err();
        assert_eq!(
            err,
            ArmCtrlError::NoSolution {
                target_m: Point3::new(3.0, 0.0, 3.0),
                unreachable: true
            }
        );

        // Target kept
        assert_eq!(arm.target().and_then(|t| t.joints()), Some((0.1, 0.2, 0.3)));
    }

    #[test]
    fn test_no_matching_config() {
        let mut arm = ArmCtrl::with_params(Params::default());

        let err = arm
            .proc(&pose(0.5, 0.6, 0.7, Some(ConfigLabel::MinusMinus)))
            .unwrap_err();
        assert!(matches!(err, ArmCtrlError::NoMatchingConfig(ConfigLabel::MinusMinus, _)));
        assert!(arm.target().is_none());
    }

    #[test]
    fn test_stop_and_safe() {
        let mut arm = ArmCtrl::with_params(Params::default());
        arm.proc(&pose(1.0, 0.0, 1.0, Some(ConfigLabel::PlusMinus)))
            .unwrap();
        let before = arm.target().cloned();

        let (dems, _) = arm
            .proc(&InputData {
                cmd: Some(ArmCmd::Stop),
            })
            .unwrap();
        assert_eq!(Some(dems), before);

        arm.make_safe();
        assert_eq!(arm.current_cmd(), Some(&ArmCmd::Stop));
        assert_eq!(arm.target().cloned(), before);
    }
}
