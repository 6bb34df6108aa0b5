//! Content-addressed expression DAG.
//!
//! Every arithmetic and boolean expression in a program is interned into one
//! [`UeMap`]. Operands are handles into the same map, so shared subterms are
//! stored once and can be let-bound once per emitted transition.

use crate::{Const, ModelError, ModelResult, Name};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::fmt;

/// Handle of an interned expression node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UeHash(pub u32);

impl fmt::Display for UeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An untyped expression node. Operands are handles into the owning
/// [`UeMap`].
///
/// The last group of variants covers constructs the elaborator can produce
/// but no backend lowering exists for; the translator rejects them with an
/// unsupported-construct error instead of emitting partial output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Ue {
    /// Reference to a state variable by fully qualified name.
    StateVar { name: Name },
    /// Current payload of a channel.
    ChanValue { chan: u32 },
    /// Presence bit of a channel.
    ChanReady { chan: u32 },
    /// Literal constant.
    Lit { value: Const },

    Not { arg: UeHash },
    And { args: Vec<UeHash> },
    Or { args: Vec<UeHash> },
    Add { lhs: UeHash, rhs: UeHash },
    Sub { lhs: UeHash, rhs: UeHash },
    Mul { lhs: UeHash, rhs: UeHash },
    Eq { lhs: UeHash, rhs: UeHash },
    Lt { lhs: UeHash, rhs: UeHash },
    Le { lhs: UeHash, rhs: UeHash },
    /// Conditional select.
    Mux {
        cond: UeHash,
        on_true: UeHash,
        on_false: UeHash,
    },

    Div { lhs: UeHash, rhs: UeHash },
    Mod { lhs: UeHash, rhs: UeHash },
    BitAnd { lhs: UeHash, rhs: UeHash },
    BitOr { lhs: UeHash, rhs: UeHash },
    BitXor { lhs: UeHash, rhs: UeHash },
    BitNot { arg: UeHash },
    Shl { lhs: UeHash, rhs: UeHash },
    Shr { lhs: UeHash, rhs: UeHash },
    IntToReal { arg: UeHash },
    RealToInt { arg: UeHash },
    MathFn { func: String, args: Vec<UeHash> },
    ArrayIndex { array: Name, index: UeHash },
    ExternVar { name: Name },
}

impl Ue {
    /// Operand handles of this node, in positional order.
    pub fn operands(&self) -> Vec<UeHash> {
        match self {
            Ue::StateVar { .. }
            | Ue::ChanValue { .. }
            | Ue::ChanReady { .. }
            | Ue::Lit { .. }
            | Ue::ExternVar { .. } => Vec::new(),
            Ue::Not { arg } | Ue::BitNot { arg } | Ue::IntToReal { arg } | Ue::RealToInt { arg } => {
                vec![*arg]
            }
            Ue::And { args } | Ue::Or { args } | Ue::MathFn { args, .. } => args.clone(),
            Ue::Add { lhs, rhs }
            | Ue::Sub { lhs, rhs }
            | Ue::Mul { lhs, rhs }
            | Ue::Eq { lhs, rhs }
            | Ue::Lt { lhs, rhs }
            | Ue::Le { lhs, rhs }
            | Ue::Div { lhs, rhs }
            | Ue::Mod { lhs, rhs }
            | Ue::BitAnd { lhs, rhs }
            | Ue::BitOr { lhs, rhs }
            | Ue::BitXor { lhs, rhs }
            | Ue::Shl { lhs, rhs }
            | Ue::Shr { lhs, rhs } => vec![*lhs, *rhs],
            Ue::Mux {
                cond,
                on_true,
                on_false,
            } => vec![*cond, *on_true, *on_false],
            Ue::ArrayIndex { index, .. } => vec![*index],
        }
    }
}

/// Content-addressed map from handle to expression node.
///
/// Interning the same node twice yields the same handle. Handles are dense
/// and ascending in interning order, which doubles as the stable tie-break
/// for topological sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Ue>", into = "Vec<Ue>")]
pub struct UeMap {
    nodes: Vec<Ue>,
    index: HashMap<Ue, UeHash>,
}

impl From<Vec<Ue>> for UeMap {
    fn from(nodes: Vec<Ue>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, ue)| (ue.clone(), UeHash(i as u32)))
            .collect();
        UeMap { nodes, index }
    }
}

impl From<UeMap> for Vec<Ue> {
    fn from(map: UeMap) -> Self {
        map.nodes
    }
}

impl UeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Intern a node, returning the handle of the existing copy if the same
    /// node was interned before.
    pub fn intern(&mut self, ue: Ue) -> UeHash {
        if let Some(&h) = self.index.get(&ue) {
            return h;
        }
        let h = UeHash(self.nodes.len() as u32);
        self.nodes.push(ue.clone());
        self.index.insert(ue, h);
        h
    }

    pub fn get(&self, h: UeHash) -> Option<&Ue> {
        self.nodes.get(h.0 as usize)
    }

    pub fn lookup(&self, h: UeHash) -> ModelResult<&Ue> {
        self.get(h).ok_or(ModelError::MissingExpr { hash: h })
    }

    /// Operand handles of the node at `h`.
    pub fn upstream(&self, h: UeHash) -> ModelResult<Vec<UeHash>> {
        Ok(self.lookup(h)?.operands())
    }

    /// All handles interned so far, ascending.
    pub fn hashes(&self) -> impl Iterator<Item = UeHash> + '_ {
        (0..self.nodes.len() as u32).map(UeHash)
    }

    /// Transitive closure of the operand relation over `roots`.
    pub fn reachable(
        &self,
        roots: impl IntoIterator<Item = UeHash>,
    ) -> ModelResult<BTreeSet<UeHash>> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<UeHash> = roots.into_iter().collect();
        while let Some(h) = stack.pop() {
            if seen.insert(h) {
                stack.extend(self.upstream(h)?);
            }
        }
        Ok(seen)
    }

    /// Kahn's algorithm over the subgraph induced by `set`: operands precede
    /// their users, ties broken by ascending handle. Fails on cycles.
    pub fn topo_sort(&self, set: &BTreeSet<UeHash>) -> ModelResult<Vec<UeHash>> {
        let mut indegree: HashMap<UeHash, usize> = set.iter().map(|&h| (h, 0)).collect();
        let mut dependents: HashMap<UeHash, Vec<UeHash>> = HashMap::new();
        for &h in set {
            for op in self.upstream(h)? {
                if set.contains(&op) {
                    *indegree.get_mut(&h).expect("h is in set") += 1;
                    dependents.entry(op).or_default().push(h);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<UeHash>> = set
            .iter()
            .filter(|h| indegree[*h] == 0)
            .map(|&h| Reverse(h))
            .collect();
        let mut order = Vec::with_capacity(set.len());
        while let Some(Reverse(h)) = ready.pop() {
            order.push(h);
            if let Some(users) = dependents.get(&h) {
                for &user in users {
                    let d = indegree.get_mut(&user).expect("user is in set");
                    *d -= 1;
                    if *d == 0 {
                        ready.push(Reverse(user));
                    }
                }
            }
        }

        if order.len() != set.len() {
            let ordered: BTreeSet<UeHash> = order.into_iter().collect();
            let stuck = set
                .iter()
                .find(|h| !ordered.contains(*h))
                .copied()
                .expect("some node remains on a cycle");
            return Err(ModelError::CyclicExpr { hash: stuck });
        }
        Ok(order)
    }
}
