//! Homogeneous transform matrices with symbolic entries

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix3, Matrix4, Point3};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::ops::Mul;

// Internal
use super::expr::{Bindings, Expr, ExprError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 4x4 homogeneous transform whose entries are expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformMatrix {
    entries: [[Expr; 4]; 4],
}

/// Position and orientation blocks of a symbolic transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolicPose {
    /// Last column, top three rows.
    pub position: [Expr; 3],

    /// Top-left 3x3 rotation block.
    pub orientation: [[Expr; 3]; 3],
}

/// Position and orientation of a frame once all symbols are bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    /// Position of the frame origin.
    ///
    /// Units: meters
    pub position_m: Point3<f64>,

    /// Rotation of the frame relative to the base.
    pub orientation: Matrix3<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TransformMatrix {
    pub fn new(entries: [[Expr; 4]; 4]) -> Self {
        Self { entries }
    }

    pub fn entry(&self, row: usize, col: usize) -> &Expr {
        &self.entries[row][col]
    }

    /// Simplify every entry.
    pub fn simplify(&self) -> Self {
        self.map(|e| e.simplify())
    }

    /// Substitute symbols in every entry.
    pub fn subs(&self, map: &HashMap<String, Expr>) -> Self {
        self.map(|e| e.subs(map))
    }

    /// True if every entry is equivalent to the matching entry of `other`.
    pub fn equivalent(&self, other: &TransformMatrix) -> bool {
        self.entries
            .iter()
            .zip(other.entries.iter())
            .all(|(ra, rb)| ra.iter().zip(rb.iter()).all(|(a, b)| a.equivalent(b)))
    }

    /// Evaluate the transform numerically.
    pub fn eval(&self, bindings: &Bindings) -> Result<Matrix4<f64>, ExprError> {
        let mut m = Matrix4::zeros();
        for (r, row) in self.entries.iter().enumerate() {
            for (c, e) in row.iter().enumerate() {
                m[(r, c)] = e.eval(bindings)?;
            }
        }
        Ok(m)
    }

    /// Extract the symbolic position and orientation blocks.
    pub fn pose(&self) -> SymbolicPose {
        SymbolicPose {
            position: std::array::from_fn(|r| self.entries[r][3].clone()),
            orientation: std::array::from_fn(|r| {
                std::array::from_fn(|c| self.entries[r][c].clone())
            }),
        }
    }

    /// Evaluate the transform and extract the numeric pose.
    pub fn eval_pose(&self, bindings: &Bindings) -> Result<Pose, ExprError> {
        let m = self.eval(bindings)?;

        Ok(Pose {
            position_m: Point3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]),
            orientation: Matrix3::from_fn(|r, c| m[(r, c)]),
        })
    }

    fn map<F: Fn(&Expr) -> Expr>(&self, f: F) -> Self {
        Self {
            entries: std::array::from_fn(|r| std::array::from_fn(|c| f(&self.entries[r][c]))),
        }
    }
}

impl<'a> Mul<&'a TransformMatrix> for &'a TransformMatrix {
    type Output = TransformMatrix;

    fn mul(self, rhs: &'a TransformMatrix) -> TransformMatrix {
        TransformMatrix {
            entries: std::array::from_fn(|r| {
                std::array::from_fn(|c| {
                    let mut terms = (0..4).map(|k| {
                        self.entries[r][k].clone() * rhs.entries[k][c].clone()
                    });
                    let first = terms.next().unwrap_or_default();
                    terms.fold(first, |acc, t| acc + t)
                })
            }),
        }
    }
}

impl fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.entries.iter() {
            writeln!(f, "[{}, {}, {}, {}]", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

impl Serialize for TransformMatrix {
    /// Serialised as rows of rendered expressions.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl fmt::Display for SymbolicPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position:")?;
        for e in self.position.iter() {
            writeln!(f, "    [{}]", e)?;
        }
        writeln!(f, "Orientation:")?;
        for row in self.orientation.iter() {
            writeln!(f, "    [{}, {}, {}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
