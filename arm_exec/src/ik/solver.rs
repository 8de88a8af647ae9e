//! Closed form IK solver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Point3;
use std::f64::consts::PI;

// Internal
use super::{BaseBranch, BranchOutcome, ElbowSign, IkParams, IkResult, IkSolution};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Inverse kinematics solver for the arm.
///
/// The solver holds only its parameters, every call to `solve` is independent.
#[derive(Debug, Clone, Default)]
pub struct IkSolver {
    params: IkParams,
}

/// Planar reduction of a target for one base branch.
#[derive(Debug, Clone, Copy)]
struct PlanarTarget {
    /// Signed horizontal reach.
    a: f64,

    /// Height.
    b: f64,

    /// Cosine of the elbow angle from the law of cosines.
    cos_theta3: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IkSolver {
    pub fn new(params: IkParams) -> Self {
        Self { params }
    }

    /// Find every solution for the target, split by joint limit validity.
    pub fn solve(&self, target_m: &Point3<f64>) -> IkResult {
        let mut result = IkResult::default();

        for branch in BaseBranch::ALL.iter() {
            match self.solve_branch(*branch, target_m) {
                BranchOutcome::Unreachable => {
                    debug!("{:?} branch cannot reach {}", branch, target_m);
                    result.unreachable = true;
                }
                BranchOutcome::Candidates(candidates) => {
                    for c in candidates {
                        if self.is_valid(&c) {
                            trace!("Valid: {}", c);
                            result.valid.push(c);
                        } else {
                            trace!("Outside joint limits: {}", c);
                            result.invalid.push(c);
                        }
                    }
                }
            }
        }

        debug!(
            "IK for {}: {} valid, {} invalid, unreachable = {}",
            target_m,
            result.valid.len(),
            result.invalid.len(),
            result.unreachable
        );

        result
    }

    /// Solve a single base branch.
    ///
    /// When the target is at full reach the two elbow signs give the same solution, in which case
    /// only one candidate is returned.
    pub fn solve_branch(&self, branch: BaseBranch, target_m: &Point3<f64>) -> BranchOutcome {
        let planar = match PlanarTarget::new(branch, target_m) {
            Some(p) => p,
            None => return BranchOutcome::Unreachable,
        };

        let elbows: &[ElbowSign] = if planar.cos_theta3.acos() == 0.0 {
            &[ElbowSign::Positive]
        } else {
            &ElbowSign::ALL
        };

        BranchOutcome::Candidates(
            elbows
                .iter()
                .map(|elbow| planar.solution(base_angle(branch, target_m), *elbow))
                .collect(),
        )
    }

    /// Solve a single branch and elbow case, or `None` if the branch cannot reach the target.
    ///
    /// Joint limits are not applied.
    pub fn solve_candidate(
        &self,
        branch: BaseBranch,
        elbow: ElbowSign,
        target_m: &Point3<f64>,
    ) -> Option<IkSolution> {
        PlanarTarget::new(branch, target_m)
            .map(|planar| planar.solution(base_angle(branch, target_m), elbow))
    }

    /// True if the solution passes the joint limits, or if they aren't enforced.
    pub fn is_valid(&self, solution: &IkSolution) -> bool {
        !self.params.enforce_joint_limits
            || self
                .params
                .within_limits(solution.theta2_rad, solution.theta3_rad)
    }
}

impl PlanarTarget {
    /// Reduce the target to the arm plane, or `None` if it is out of reach.
    ///
    /// The reach check is exact with no tolerance, so a target at full reach can be rejected when
    /// rounding pushes `|cos_theta3|` just past one.
    fn new(branch: BaseBranch, target_m: &Point3<f64>) -> Option<Self> {
        let a = branch.sign() * (target_m.x.powi(2) + target_m.y.powi(2)).sqrt();
        let b = target_m.z;

        // Law of cosines with unit links
        let cos_theta3 = (a.powi(2) + b.powi(2) - 2.0) / 2.0;

        if cos_theta3.abs() > 1.0 {
            return None;
        }

        Some(Self { a, b, cos_theta3 })
    }

    fn solution(&self, theta1_rad: f64, elbow: ElbowSign) -> IkSolution {
        let theta3_rad = elbow.sign() * self.cos_theta3.acos();

        let c = 2.0 * (theta3_rad / 2.0).cos().powi(2);
        let d = theta3_rad.sin();
        let theta2_rad = (self.b * c - self.a * d).atan2(self.a * c + self.b * d);

        IkSolution::new(theta1_rad, theta2_rad, theta3_rad)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Base angle for the branch, kept in `(-pi, pi]`.
fn base_angle(branch: BaseBranch, target_m: &Point3<f64>) -> f64 {
    let theta1_rad = target_m.y.atan2(target_m.x);

    match branch {
        BaseBranch::Forward => theta1_rad,
        BaseBranch::Backward if theta1_rad < 0.0 => theta1_rad + PI,
        BaseBranch::Backward => theta1_rad - PI,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ik::ConfigLabel;
    use approx::assert_abs_diff_eq;

    /// End effector position for the given joints.
    fn fk(s: &IkSolution) -> Point3<f64> {
        let (t1, t2, t3) = s.joints();
        let reach = t2.cos() + (t2 + t3).cos();
        Point3::new(t1.cos() * reach, t1.sin() * reach, t2.sin() + (t2 + t3).sin())
    }

    #[test]
    fn test_example_target() {
        let target = Point3::new(0.5, 0.6, 0.7);
        let result = IkSolver::default().solve(&target);

        assert!(!result.unreachable);
        assert_eq!(result.num_candidates(), 4);
        assert_eq!(result.valid.len(), 3);
        assert_eq!(result.invalid.len(), 1);

        for s in result.candidates() {
            assert_abs_diff_eq!(fk(s), target, epsilon = 1e-9);
        }

        // The backward elbow-negative case folds the shoulder past the lower limit
        assert_eq!(result.invalid[0].config, ConfigLabel::MinusMinus);
        assert!(result.invalid[0].theta2_rad < -PI / 4.0);
    }

    #[test]
    fn test_labels_partition() {
        let result = IkSolver::default().solve(&Point3::new(0.5, 0.6, 0.7));

        let mut labels: Vec<ConfigLabel> = result.candidates().map(|s| s.config).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 4);

        for s in result.candidates() {
            assert_eq!(s.config, ConfigLabel::from_angles(s.theta2_rad, s.theta3_rad));
        }
    }

    #[test]
    fn test_full_reach() {
        let solver = IkSolver::default();
        let target = Point3::new(2.0, 0.0, 0.0);

        for branch in BaseBranch::ALL.iter() {
            match solver.solve_branch(*branch, &target) {
                BranchOutcome::Candidates(c) => {
                    assert_eq!(c.len(), 1);
                    assert_eq!(c[0].theta3_rad, 0.0);
                    assert!(c[0].config.as_str().ends_with("minus"));
                }
                BranchOutcome::Unreachable => panic!("{:?} branch should reach", branch),
            }
        }

        let result = solver.solve(&target);
        assert!(!result.unreachable);
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].joints(), (0.0, 0.0, 0.0));
        assert_eq!(result.valid[0].config, ConfigLabel::MinusMinus);

        // Reaching backwards over the top puts the shoulder at pi
        assert_eq!(result.invalid.len(), 1);
        assert_abs_diff_eq!(result.invalid[0].theta1_rad, -PI);
        assert_abs_diff_eq!(result.invalid[0].theta2_rad, PI);
    }

    #[test]
    fn test_unreachable() {
        let solver = IkSolver::default();
        let target = Point3::new(3.0, 0.0, 3.0);

        let result = solver.solve(&target);
        assert!(result.unreachable);
        assert_eq!(result.num_candidates(), 0);

        for branch in BaseBranch::ALL.iter() {
            assert_eq!(solver.solve_branch(*branch, &target), BranchOutcome::Unreachable);
            for elbow in ElbowSign::ALL.iter() {
                assert_eq!(solver.solve_candidate(*branch, *elbow, &target), None);
            }
        }
    }

    #[test]
    fn test_full_reach_rounding() {
        // Mathematically at full reach, but cos_theta3 rounds to just over one
        let target = Point3::new(2f64.sqrt(), 0.0, 2f64.sqrt());
        let result = IkSolver::default().solve(&target);

        assert!(result.unreachable);
        assert_eq!(result.num_candidates(), 0);
    }

    #[test]
    fn test_individual_cases() {
        let solver = IkSolver::default();
        let target = Point3::new(0.5, 0.6, 0.7);

        let fwd_pos = solver
            .solve_candidate(BaseBranch::Forward, ElbowSign::Positive, &target)
            .unwrap();
        assert!(fwd_pos.theta3_rad > 0.0);
        assert_abs_diff_eq!(fwd_pos.theta1_rad, 0.6f64.atan2(0.5));

        let fwd_neg = solver
            .solve_candidate(BaseBranch::Forward, ElbowSign::Negative, &target)
            .unwrap();
        assert_abs_diff_eq!(fwd_neg.theta3_rad, -fwd_pos.theta3_rad);

        let bwd_pos = solver
            .solve_candidate(BaseBranch::Backward, ElbowSign::Positive, &target)
            .unwrap();
        assert_abs_diff_eq!(bwd_pos.theta1_rad, 0.6f64.atan2(0.5) - PI);
        assert_abs_diff_eq!(fk(&bwd_pos), target, epsilon = 1e-9);
    }

    #[test]
    fn test_backward_base_angle() {
        let target = Point3::new(0.5, -0.6, 0.7);
        let theta1 = base_angle(BaseBranch::Backward, &target);

        assert!(theta1 > 0.0 && theta1 <= PI);
        assert_abs_diff_eq!(theta1, (-0.6f64).atan2(0.5) + PI);
    }

    #[test]
    fn test_limits_disabled() {
        let target = Point3::new(0.5, 0.6, 0.7);
        let enforced = IkSolver::default().solve(&target);
        let free = IkSolver::new(IkParams {
            enforce_joint_limits: false,
            ..IkParams::default()
        })
        .solve(&target);

        assert!(free.invalid.is_empty());
        assert_eq!(free.valid.len(), enforced.num_candidates());
        for s in enforced.candidates() {
            assert!(free.valid.contains(s));
        }
    }

    #[test]
    fn test_select() {
        let result = IkSolver::default().solve(&Point3::new(0.5, 0.6, 0.7));

        let s = result.select(ConfigLabel::PlusMinus).unwrap();
        assert_eq!(s.config, ConfigLabel::PlusMinus);

        // The only minus-minus candidate is outside the limits
        assert!(result.select(ConfigLabel::MinusMinus).is_none());
    }
}
