//! Checks the shipped parameter files and scripts against the library

use approx::assert_abs_diff_eq;
use arm_lib::{
    arm_ctrl,
    dh_chain::{DhTable, TransformId},
    fwd_kin::ForwardKinematics,
    params::ArmExecParams,
};
use util::script_interpreter::ScriptInterpreter;

#[test]
fn dh_chain_params_match_arm() {
    let table: DhTable = toml::from_str(include_str!("../../params/dh_chain.toml")).unwrap();

    let mut chain = table.build().unwrap();
    chain.simplify_matrices(&[TransformId::base(3)]).unwrap();

    let arm = ForwardKinematics::new().unwrap();
    assert!(chain
        .get(TransformId::base(3), true)
        .unwrap()
        .equivalent(arm.transform()));

    let from_file = ForwardKinematics::from_table(&table).unwrap();
    assert!(from_file.transform().equivalent(arm.transform()));
}

#[test]
fn arm_ctrl_params_match_defaults() {
    let params: arm_ctrl::Params =
        toml::from_str(include_str!("../../params/arm_ctrl.toml")).unwrap();
    let default = arm_ctrl::Params::default();

    assert_eq!(params.default_config, default.default_config);
    assert_eq!(params.ik.enforce_joint_limits, default.ik.enforce_joint_limits);
    assert_abs_diff_eq!(params.ik.theta2_min_rad, default.ik.theta2_min_rad, epsilon = 1e-12);
    assert_abs_diff_eq!(params.ik.theta2_max_rad, default.ik.theta2_max_rad, epsilon = 1e-12);
    assert_abs_diff_eq!(params.ik.theta3_min_rad, default.ik.theta3_min_rad, epsilon = 1e-12);
    assert_abs_diff_eq!(params.ik.theta3_max_rad, default.ik.theta3_max_rad, epsilon = 1e-12);
}

#[test]
fn arm_exec_params_load() {
    let params: ArmExecParams =
        toml::from_str(include_str!("../../params/arm_exec.toml")).unwrap();

    assert!(params.cycle_period_s > 0.0);
}

#[test]
fn demo_script_loads() {
    let si = ScriptInterpreter::from_script(include_str!("../../scripts/arm_demo.txt")).unwrap();

    assert_eq!(si.get_num_tcs(), 8);
    assert_eq!(si.get_duration(), 14.0);
}
