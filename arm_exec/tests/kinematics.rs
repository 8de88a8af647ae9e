//! Inverse kinematics checked against the forward model built from the DH chain

use approx::assert_abs_diff_eq;
use arm_lib::{
    dh_chain::{DhChain, LinkParams, TransformId},
    fwd_kin::ForwardKinematics,
    ik::{ConfigLabel, IkParams, IkSolver},
};
use nalgebra::Point3;
use std::collections::BTreeMap;

/// Targets spread over the workspace, including points behind and below the base.
fn targets() -> Vec<Point3<f64>> {
    let mut targets = Vec::new();
    for &x in [-1.2, -0.4, 0.0, 0.5, 1.1].iter() {
        for &y in [-0.9, 0.0, 0.6].iter() {
            for &z in [-0.8, 0.0, 0.7, 1.3].iter() {
                targets.push(Point3::new(x, y, z));
            }
        }
    }
    targets
}

#[test]
fn ik_round_trip() {
    let fk = ForwardKinematics::new().unwrap();
    let solver = IkSolver::new(IkParams {
        enforce_joint_limits: false,
        ..IkParams::default()
    });

    let mut num_checked = 0;

    for target in targets() {
        let result = solver.solve(&target);

        for s in result.valid.iter() {
            let reached = fk.solve(s.joints()).unwrap();
            assert_abs_diff_eq!(reached, target, epsilon = 1e-9);
            num_checked += 1;
        }
    }

    assert!(num_checked > 0);
}

#[test]
fn example_target() {
    let result = IkSolver::default().solve(&Point3::new(0.5, 0.6, 0.7));

    assert!(!result.unreachable);
    assert_eq!(result.valid.len() + result.invalid.len(), 4);
}

#[test]
fn boundary_target() {
    let result = IkSolver::new(IkParams {
        enforce_joint_limits: false,
        ..IkParams::default()
    })
    .solve(&Point3::new(2.0, 0.0, 0.0));

    // One elbow solution per branch, straight out
    assert!(!result.unreachable);
    assert_eq!(result.valid.len(), 2);
    for s in result.valid.iter() {
        assert_eq!(s.theta3_rad, 0.0);
    }
}

#[test]
fn unreachable_target() {
    let result = IkSolver::default().solve(&Point3::new(3.0, 0.0, 3.0));

    assert!(result.unreachable);
    assert!(result.valid.is_empty());
    assert!(result.invalid.is_empty());
}

#[test]
fn labels_partition_candidates() {
    let solver = IkSolver::default();

    for target in targets() {
        let result = solver.solve(&target);

        for s in result.candidates() {
            let matching = ConfigLabel::ALL
                .iter()
                .filter(|l| **l == ConfigLabel::from_angles(s.theta2_rad, s.theta3_rad))
                .count();
            assert_eq!(matching, 1);
            assert_eq!(s.config, ConfigLabel::from_angles(s.theta2_rad, s.theta3_rad));
        }
    }
}

#[test]
fn disabled_limits_report_every_candidate() {
    let enforced = IkSolver::default();
    let free = IkSolver::new(IkParams {
        enforce_joint_limits: false,
        ..IkParams::default()
    });

    for target in targets() {
        let a = enforced.solve(&target);
        let b = free.solve(&target);

        assert!(b.invalid.is_empty());
        assert_eq!(a.unreachable, b.unreachable);
        assert_eq!(b.valid.len(), a.num_candidates());
        for s in a.candidates() {
            assert!(b.valid.contains(s));
        }
    }
}

#[test]
fn symbolic_composition_law() {
    // Every parameter left free
    let mut chain = DhChain::new(3).unwrap();
    let mut links = BTreeMap::new();
    for i in 0..3 {
        links.insert(TransformId::link(i), LinkParams::new());
    }
    chain.apply_substitutions(&links).unwrap();
    chain.build_compound_matrices().unwrap();

    let a01 = chain.get(TransformId::link(0), false).unwrap().clone();
    let a12 = chain.get(TransformId::link(1), false).unwrap().clone();
    let a23 = chain.get(TransformId::link(2), false).unwrap().clone();
    let a03 = chain.get(TransformId::base(3), false).unwrap().clone();

    assert!(a03.equivalent(&(&(&a01 * &a12) * &a23)));

    // Simplification keeps the transform unchanged
    chain.simplify_matrices(&[TransformId::base(3)]).unwrap();
    assert!(chain
        .get(TransformId::base(3), true)
        .unwrap()
        .equivalent(&a03));
}
