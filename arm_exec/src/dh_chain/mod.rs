//! Denavit-Hartenberg chain builder
//!
//! Builds per-link homogeneous transforms from DH parameters, composes them into base-to-link
//! transforms and reduces the result with exact trigonometric identities.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chain;
mod expr;
mod matrix;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Internal
pub use chain::*;
pub use expr::*;
pub use matrix::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifies the transform from frame `from` to frame `to`.
///
/// Displays as `A{from}{to}`, so the link from frame 0 to frame 1 is `A01` and the compound
/// transform from the base to frame 3 is `A03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransformId {
    pub from: usize,
    pub to: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Chain configuration errors.
///
/// These are raised while setting up a chain and must be handled before any kinematics are
/// computed from it.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChainError {
    #[error("Chain length must be at least 1")]
    EmptyChain,

    #[error("Expected a chain of {expected} links, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("Transform {0} was never declared in the chain")]
    Undeclared(TransformId),

    #[error("Transform {0} is neither a link between adjacent frames nor a base transform")]
    InvalidTransform(TransformId),

    #[error("Transform {0} is not a link between adjacent frames")]
    NotALink(TransformId),

    #[error("Link {0} has not been instantiated")]
    LinkNotInstantiated(TransformId),

    #[error("Transform {0} has not been built yet")]
    NotBuilt(TransformId),

    #[error("Invalid transform name \"{0}\", expected A<from><to> such as A01")]
    InvalidName(String),

    #[error("Expression error: {0}")]
    ExprError(#[from] ExprError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TransformId {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// The link from frame `index` to frame `index + 1`.
    pub fn link(index: usize) -> Self {
        Self::new(index, index + 1)
    }

    /// The compound transform from the base to frame `to`.
    pub fn base(to: usize) -> Self {
        Self::new(0, to)
    }

    /// True if this transform is between adjacent frames.
    pub fn is_link(&self) -> bool {
        self.to == self.from + 1
    }

    /// True if this is a base-to-frame transform spanning more than one link.
    pub fn is_compound(&self) -> bool {
        self.from == 0 && self.to >= 2
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}{}", self.from, self.to)
    }
}

impl FromStr for TransformId {
    type Err = ChainError;

    /// Parse a name such as `A12`.
    ///
    /// Only single digit frame indices can be named.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChainError::InvalidName(s.to_string());

        let digits = s.strip_prefix('A').ok_or_else(invalid)?;
        let mut chars = digits.chars();

        match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(t), None) => Ok(TransformId::new(
                f.to_digit(10).ok_or_else(invalid)? as usize,
                t.to_digit(10).ok_or_else(invalid)? as usize,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for TransformId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TransformId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
