//! DH chain construction and composition

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use conquer_once::OnceCell;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// Internal
use super::{ChainError, Expr, SymbolicPose, TransformId, TransformMatrix};

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// The generic link transform, built on first use and shared by every chain.
static GENERIC_LINK: OnceCell<TransformMatrix> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const THETA_I: &str = "theta_i";
const ALPHA_I: &str = "alpha_i";
const R_I: &str = "r_i";
const D_I: &str = "d_i";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// DH parameters of a single link.
///
/// A parameter left as `None` becomes a free symbol named after the link's distal frame, so
/// that the link `A12` has `theta_2`, `alpha_2`, `r_2` and `d_2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkParams {
    /// Twist about the common normal.
    pub alpha: Option<Expr>,

    /// Length of the common normal.
    pub r: Option<Expr>,

    /// Offset along the previous z axis.
    pub d: Option<Expr>,

    /// Rotation about the previous z axis.
    pub theta: Option<Expr>,
}

/// A DH table as found in a parameter file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DhTable {
    /// Number of links in the chain.
    pub chain_length: usize,

    /// Parameters for each link, keyed by the link's name (e.g. `A01`).
    #[serde(default)]
    pub links: BTreeMap<TransformId, LinkParams>,
}

/// Storage for one transform of the chain.
#[derive(Debug, Clone, Default)]
struct Slot {
    raw: Option<TransformMatrix>,
    simplified: Option<TransformMatrix>,
}

/// A kinematic chain of DH links and their base-to-link compounds.
///
/// Transforms can only be built for identifiers that were declared when the chain was
/// created.
#[derive(Debug, Clone)]
pub struct DhChain {
    chain_length: usize,
    slots: BTreeMap<TransformId, Slot>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate the transform identifiers for a chain of `chain_length` links.
///
/// Links `A{i}{i+1}` come first in chain order, followed by the compounds `A0{k}` for
/// `k = 2..=chain_length`.
pub fn generate_chain(chain_length: usize) -> Vec<TransformId> {
    (0..chain_length)
        .map(TransformId::link)
        .chain((2..=chain_length).map(TransformId::base))
        .collect()
}

/// The generic DH link transform over `theta_i`, `alpha_i`, `r_i` and `d_i`.
pub fn generic_link() -> &'static TransformMatrix {
    GENERIC_LINK.get_or_init(build_generic_link)
}

/// Instantiate the transform of the link `id` from its parameters.
pub fn instantiate_link(id: TransformId, params: &LinkParams) -> TransformMatrix {
    let index = id.to;
    let or_symbol = |value: &Option<Expr>, name: &str| match value {
        Some(e) => e.clone(),
        None => Expr::sym(format!("{}_{}", name, index)),
    };

    let mut map = HashMap::new();
    map.insert(THETA_I.to_string(), or_symbol(&params.theta, "theta"));
    map.insert(ALPHA_I.to_string(), or_symbol(&params.alpha, "alpha"));
    map.insert(R_I.to_string(), or_symbol(&params.r, "r"));
    map.insert(D_I.to_string(), or_symbol(&params.d, "d"));

    generic_link().subs(&map)
}

/// Compose link transforms base to tip.
///
/// Given the links `A01, A12, .., A(N-1)N` returns the compounds `A02, .., A0N`, each being
/// the previous compound multiplied on the right by the next link.
pub fn compose_chain(links: &[TransformMatrix]) -> Vec<TransformMatrix> {
    let mut compounds: Vec<TransformMatrix> = Vec::new();

    for (k, link) in links.iter().enumerate().skip(1) {
        let next = match compounds.last() {
            Some(prev) => prev * link,
            None => &links[k - 1] * link,
        };
        compounds.push(next);
    }

    compounds
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LinkParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alpha<E: Into<Expr>>(mut self, alpha: E) -> Self {
        self.alpha = Some(alpha.into());
        self
    }

    pub fn r<E: Into<Expr>>(mut self, r: E) -> Self {
        self.r = Some(r.into());
        self
    }

    pub fn d<E: Into<Expr>>(mut self, d: E) -> Self {
        self.d = Some(d.into());
        self
    }

    pub fn theta<E: Into<Expr>>(mut self, theta: E) -> Self {
        self.theta = Some(theta.into());
        self
    }
}

impl DhTable {
    /// Build the chain described by this table, with every listed link instantiated and all
    /// compounds composed.
    pub fn build(&self) -> Result<DhChain, ChainError> {
        let mut chain = DhChain::new(self.chain_length)?;
        chain.apply_substitutions(&self.links)?;
        chain.build_compound_matrices()?;
        Ok(chain)
    }
}

impl DhChain {
    /// Create a chain declaring every identifier from `generate_chain`.
    pub fn new(chain_length: usize) -> Result<Self, ChainError> {
        Self::with_declared(&generate_chain(chain_length))
    }

    /// Create a chain declaring only the given identifiers.
    pub fn with_declared(ids: &[TransformId]) -> Result<Self, ChainError> {
        let mut slots = BTreeMap::new();
        let mut chain_length = 0;

        for id in ids.iter() {
            if !id.is_link() && !id.is_compound() {
                return Err(ChainError::InvalidTransform(*id));
            }
            chain_length = chain_length.max(id.to);
            slots.insert(*id, Slot::default());
        }

        if chain_length == 0 {
            return Err(ChainError::EmptyChain);
        }

        debug!(
            "Declared chain of length {}: {:?}",
            chain_length,
            slots.keys().map(|id| id.to_string()).collect::<Vec<_>>()
        );

        Ok(Self {
            chain_length,
            slots,
        })
    }

    /// Declared identifiers in table order.
    pub fn declared(&self) -> Vec<TransformId> {
        self.slots.keys().copied().collect()
    }

    /// Instantiate a single declared link.
    pub fn instantiate_link(
        &mut self,
        id: TransformId,
        params: &LinkParams,
    ) -> Result<(), ChainError> {
        let slot = self.slots.get_mut(&id).ok_or(ChainError::Undeclared(id))?;
        if !id.is_link() {
            return Err(ChainError::NotALink(id));
        }

        *slot = Slot {
            raw: Some(instantiate_link(id, params)),
            simplified: None,
        };

        trace!("Instantiated {} from {:?}", id, params);

        Ok(())
    }

    /// Instantiate every link in the map from its parameters.
    ///
    /// All identifiers are validated before any link is instantiated.
    pub fn apply_substitutions(
        &mut self,
        substitutions: &BTreeMap<TransformId, LinkParams>,
    ) -> Result<(), ChainError> {
        for id in substitutions.keys() {
            if !self.slots.contains_key(id) {
                return Err(ChainError::Undeclared(*id));
            }
            if !id.is_link() {
                return Err(ChainError::NotALink(*id));
            }
        }

        for (id, params) in substitutions.iter() {
            self.instantiate_link(*id, params)?;
        }

        Ok(())
    }

    /// Compose every declared compound transform from the links.
    ///
    /// Every link of the chain must be declared and instantiated.
    pub fn build_compound_matrices(&mut self) -> Result<(), ChainError> {
        let mut links = Vec::with_capacity(self.chain_length);
        for index in 0..self.chain_length {
            let id = TransformId::link(index);
            let slot = self.slots.get(&id).ok_or(ChainError::Undeclared(id))?;
            links.push(
                slot.raw
                    .clone()
                    .ok_or(ChainError::LinkNotInstantiated(id))?,
            );
        }

        for (i, compound) in compose_chain(&links).into_iter().enumerate() {
            let id = TransformId::base(i + 2);
            if let Some(slot) = self.slots.get_mut(&id) {
                *slot = Slot {
                    raw: Some(compound),
                    simplified: None,
                };
                trace!("Composed {}", id);
            }
        }

        Ok(())
    }

    /// Simplify the given transforms, keeping the simplified copies alongside the raw ones.
    pub fn simplify_matrices(&mut self, ids: &[TransformId]) -> Result<(), ChainError> {
        for id in ids.iter() {
            let slot = self.slots.get_mut(id).ok_or(ChainError::Undeclared(*id))?;
            let raw = slot.raw.as_ref().ok_or(ChainError::NotBuilt(*id))?;
            slot.simplified = Some(raw.simplify());
            debug!("Simplified {}", id);
        }

        Ok(())
    }

    /// Get a built transform, or its simplified version if `simplified` is set.
    pub fn get(&self, id: TransformId, simplified: bool) -> Result<&TransformMatrix, ChainError> {
        let slot = self.slots.get(&id).ok_or(ChainError::Undeclared(id))?;

        let matrix = match simplified {
            true => slot.simplified.as_ref(),
            false => slot.raw.as_ref(),
        };

        matrix.ok_or(ChainError::NotBuilt(id))
    }

    /// Extract the symbolic pose from a built transform.
    pub fn extract_pose(
        &self,
        id: TransformId,
        simplified: bool,
    ) -> Result<SymbolicPose, ChainError> {
        Ok(self.get(id, simplified)?.pose())
    }

    /// Save built transforms into the session as JSON, named `{id}{postfix}.json`.
    pub fn save_matrices(
        &self,
        ids: &[TransformId],
        simplified: bool,
        postfix: &str,
    ) -> Result<(), ChainError> {
        for id in ids.iter() {
            let matrix = self.get(*id, simplified)?.clone();
            util::session::save(format!("dh_chain/{}{}.json", id, postfix), matrix);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn build_generic_link() -> TransformMatrix {
    let theta = || Expr::sym(THETA_I);
    let alpha = || Expr::sym(ALPHA_I);
    let r = || Expr::sym(R_I);
    let d = || Expr::sym(D_I);

    TransformMatrix::new([
        [
            theta().cos(),
            -(theta().sin() * alpha().cos()),
            theta().sin() * alpha().sin(),
            r() * theta().cos(),
        ],
        [
            theta().sin(),
            theta().cos() * alpha().cos(),
            -(theta().cos() * alpha().sin()),
            r() * theta().sin(),
        ],
        [Expr::num(0.0), alpha().sin(), alpha().cos(), d()],
        [Expr::num(0.0), Expr::num(0.0), Expr::num(0.0), Expr::num(1.0)],
    ])
    .simplify()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
