//! Forward kinematics of the arm, derived from its DH chain

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Point3;
use std::collections::BTreeMap;

// Internal
use crate::dh_chain::{
    Bindings, ChainError, DhTable, Expr, LinkParams, Pose, TransformId, TransformMatrix,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of links in the arm.
pub const ARM_CHAIN_LENGTH: usize = 3;

/// Names of the joint symbols, base to tip.
pub const JOINT_SYMBOLS: [&str; ARM_CHAIN_LENGTH] = ["theta_1", "theta_2", "theta_3"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Forward model of the arm.
///
/// The base to end effector transform is built and simplified once, with the joint angles left
/// symbolic, then evaluated for each set of joint angles.
#[derive(Debug, Clone)]
pub struct ForwardKinematics {
    a03: TransformMatrix,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The DH table of the arm.
///
/// The base link twists by pi/2 with no length, the two planar links have unit length. Joint
/// angles are left free.
pub fn arm_dh_table() -> DhTable {
    let mut links = BTreeMap::new();

    links.insert(
        TransformId::link(0),
        LinkParams::new().alpha(Expr::frac_pi(1, 2)).r(0.0).d(0.0),
    );
    links.insert(TransformId::link(1), LinkParams::new().alpha(0.0).r(1.0).d(0.0));
    links.insert(TransformId::link(2), LinkParams::new().alpha(0.0).r(1.0).d(0.0));

    DhTable {
        chain_length: ARM_CHAIN_LENGTH,
        links,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ForwardKinematics {
    /// Build the forward model of the arm.
    pub fn new() -> Result<Self, ChainError> {
        Self::from_table(&arm_dh_table())
    }

    /// Build a forward model from any three link table whose only free symbols are the joint
    /// angles.
    pub fn from_table(table: &DhTable) -> Result<Self, ChainError> {
        if table.chain_length != ARM_CHAIN_LENGTH {
            return Err(ChainError::WrongLength {
                expected: ARM_CHAIN_LENGTH,
                found: table.chain_length,
            });
        }

        let mut chain = table.build()?;
        let id = TransformId::base(ARM_CHAIN_LENGTH);
        chain.simplify_matrices(&[id])?;

        let a03 = chain.get(id, true)?.clone();
        debug!("Forward model:\n{}", a03);

        Ok(Self { a03 })
    }

    /// The simplified base to end effector transform.
    pub fn transform(&self) -> &TransformMatrix {
        &self.a03
    }

    /// End effector pose for the given joint angles.
    pub fn solve_pose(&self, joints_rad: (f64, f64, f64)) -> Result<Pose, ChainError> {
        let mut bindings = Bindings::new();
        bindings.insert(JOINT_SYMBOLS[0].to_string(), joints_rad.0);
        bindings.insert(JOINT_SYMBOLS[1].to_string(), joints_rad.1);
        bindings.insert(JOINT_SYMBOLS[2].to_string(), joints_rad.2);

        Ok(self.a03.eval_pose(&bindings)?)
    }

    /// End effector position for the given joint angles.
    pub fn solve(&self, joints_rad: (f64, f64, f64)) -> Result<Point3<f64>, ChainError> {
        Ok(self.solve_pose(joints_rad)?.position_m)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_closed_form() {
        let fk = ForwardKinematics::new().unwrap();
        let pos = fk.transform().pose().position;

        assert_eq!(
            pos[0].to_string(),
            "cos(theta_1)*cos(theta_2) + cos(theta_1)*cos(theta_2 + theta_3)"
        );
        assert_eq!(
            pos[1].to_string(),
            "sin(theta_1)*cos(theta_2) + sin(theta_1)*cos(theta_2 + theta_3)"
        );
        assert_eq!(
            pos[2].to_string(),
            "sin(theta_2) + sin(theta_2 + theta_3)"
        );
    }

    #[test]
    fn test_known_poses() {
        let fk = ForwardKinematics::new().unwrap();

        assert_abs_diff_eq!(fk.solve((0.0, 0.0, 0.0)).unwrap(), Point3::new(2.0, 0.0, 0.0));
        assert_abs_diff_eq!(
            fk.solve((FRAC_PI_2, 0.0, 0.0)).unwrap(),
            Point3::new(0.0, 2.0, 0.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            fk.solve((0.0, FRAC_PI_2, -FRAC_PI_2)).unwrap(),
            Point3::new(1.0, 0.0, 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pose_orientation() {
        let fk = ForwardKinematics::new().unwrap();
        let pose = fk.solve_pose((0.3, -0.2, 0.9)).unwrap();

        let home = fk.solve_pose((0.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(
            home.orientation,
            nalgebra::Matrix3::new(1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0),
            epsilon = 1e-12
        );

        // Rotation block is orthonormal
        let r = pose.orientation;
        assert_abs_diff_eq!(r * r.transpose(), nalgebra::Matrix3::identity(), epsilon = 1e-12);
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wrong_chain_length() {
        let mut table = arm_dh_table();
        table.chain_length = 2;
        assert_eq!(
            ForwardKinematics::from_table(&table).unwrap_err(),
            ChainError::WrongLength {
                expected: 3,
                found: 2
            }
        );
    }
}
