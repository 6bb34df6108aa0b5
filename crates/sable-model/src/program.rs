//! The elaborated program: rules, channels, properties, and validation.

use crate::{ModelError, ModelResult, Name, PrimType, StateLeaf, StateNode, Ue, UeHash, UeMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A directed point-to-point channel between two nodes.
///
/// Each channel materializes as two state variables: the payload
/// (`‹name›!var`, meaningful only while ready) and the presence bit
/// (`‹name›!ready`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDesc {
    /// Unique across the system.
    pub id: u32,
    /// Fully qualified name; matches a `Chan` leaf in the hierarchy.
    pub name: Name,
    pub elem: PrimType,
    pub writer: u32,
    pub reader: u32,
}

impl ChannelDesc {
    /// Name of the payload state variable.
    pub fn value_name(&self) -> Name {
        self.name.scope("var")
    }

    /// Name of the presence-bit state variable.
    pub fn ready_name(&self) -> Name {
        self.name.scope("ready")
    }

    /// Name of the nondeterministic-corruption input variable.
    pub fn fault_value_name(&self) -> Name {
        self.name.scope("fault_value").scope(&self.id.to_string())
    }
}

/// One assignment within a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    /// A state-variable leaf or a channel `!var` / `!ready` field.
    pub target: Name,
    pub value: UeHash,
}

/// A message sent on a channel when the rule fires. Lowered to assignments of
/// the channel's payload and presence-bit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanWrite {
    pub chan: u32,
    pub value: UeHash,
}

/// An atomic guarded transition fragment. At most one rule fires per master
/// step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique across the system; numbers the emitted transition.
    pub id: u32,
    /// Qualified name of the node this rule was elaborated from.
    pub node: Name,
    /// Boolean guard; `None` means the rule is always enabled.
    pub guard: Option<UeHash>,
    pub assigns: Vec<Assign>,
    pub chan_writes: Vec<ChanWrite>,
}

impl Rule {
    /// Root expression handles: the guard plus every right-hand side.
    pub fn roots(&self) -> Vec<UeHash> {
        let mut roots = Vec::new();
        roots.extend(self.guard);
        roots.extend(self.assigns.iter().map(|a| a.value));
        roots.extend(self.chan_writes.iter().map(|w| w.value));
        roots
    }

    /// Name of this rule's per-node fault input variable.
    pub fn fault_input_name(&self) -> Name {
        self.node.scope("faulty_node").scope(&self.id.to_string())
    }
}

/// A named safety property, emitted as a query against the transition
/// system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub name: String,
    pub body: UeHash,
}

/// A complete elaborated program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// System name; every emitted declaration name derives from it.
    pub name: Name,
    pub hierarchy: StateNode,
    pub exprs: UeMap,
    pub rules: Vec<Rule>,
    pub channels: Vec<ChannelDesc>,
    #[serde(default)]
    pub props: Vec<Prop>,
}

impl Program {
    pub fn channel(&self, id: u32) -> Option<&ChannelDesc> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// The set of expression handles a rule transitively uses.
    pub fn used_exprs(&self, rule: &Rule) -> ModelResult<BTreeSet<UeHash>> {
        self.exprs.reachable(rule.roots())
    }

    /// Check every invariant the translator depends on. Any failure means
    /// the producing elaborator is buggy; translation must not proceed.
    pub fn validate(&self) -> ModelResult<()> {
        self.hierarchy.check_sibling_names()?;

        // The whole expression graph must be closed and acyclic.
        let all: BTreeSet<UeHash> = self.exprs.hashes().collect();
        for &h in &all {
            for op in self.exprs.upstream(h)? {
                self.exprs.lookup(op)?;
            }
        }
        self.exprs.topo_sort(&all)?;

        // Assignable fields: state-variable leaves plus channel fields.
        let mut var_names: HashSet<Name> = HashSet::new();
        let mut chan_leaves: HashSet<Name> = HashSet::new();
        for leaf in self.hierarchy.leaves() {
            match leaf {
                StateLeaf::Var { name, .. } => {
                    var_names.insert(name);
                }
                StateLeaf::Chan { name, .. } => {
                    chan_leaves.insert(name.clone());
                    var_names.insert(name.scope("var"));
                    var_names.insert(name.scope("ready"));
                }
            }
        }

        let mut chan_ids: HashMap<u32, &ChannelDesc> = HashMap::new();
        for chan in &self.channels {
            if chan_ids.insert(chan.id, chan).is_some() {
                return Err(ModelError::DuplicateChannelId { id: chan.id });
            }
            if !chan_leaves.contains(&chan.name) {
                return Err(ModelError::ChannelNotInHierarchy {
                    id: chan.id,
                    name: chan.name.clone(),
                });
            }
        }

        // Every variable reference must resolve.
        for h in self.exprs.hashes() {
            match self.exprs.lookup(h)? {
                Ue::StateVar { name } => {
                    if !var_names.contains(name) {
                        return Err(ModelError::UnknownVarRef { name: name.clone() });
                    }
                }
                Ue::ChanValue { chan } | Ue::ChanReady { chan } => {
                    if !chan_ids.contains_key(chan) {
                        return Err(ModelError::UnknownChannel { chan: *chan });
                    }
                }
                _ => {}
            }
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            if !rule_ids.insert(rule.id) {
                return Err(ModelError::DuplicateRuleId { id: rule.id });
            }
            for h in rule.roots() {
                self.exprs.lookup(h)?;
            }

            // Targets must exist and be assigned at most once, counting the
            // two fields a channel write touches.
            let mut assigned: HashSet<Name> = HashSet::new();
            for assign in &rule.assigns {
                if !var_names.contains(&assign.target) {
                    return Err(ModelError::UnknownTarget {
                        rule: rule.id,
                        target: assign.target.clone(),
                    });
                }
                if !assigned.insert(assign.target.clone()) {
                    return Err(ModelError::DuplicateTarget {
                        rule: rule.id,
                        target: assign.target.clone(),
                    });
                }
            }
            for write in &rule.chan_writes {
                let chan = chan_ids
                    .get(&write.chan)
                    .ok_or(ModelError::UnknownChannel { chan: write.chan })?;
                for field in [chan.value_name(), chan.ready_name()] {
                    if !assigned.insert(field.clone()) {
                        return Err(ModelError::DuplicateTarget {
                            rule: rule.id,
                            target: field,
                        });
                    }
                }
            }
        }

        for prop in &self.props {
            self.exprs.lookup(prop.body)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Const;

    fn minimal() -> Program {
        let mut exprs = UeMap::new();
        let x = Name::segment("sys").scope("x");
        let x_ref = exprs.intern(Ue::StateVar { name: x.clone() });
        let one = exprs.intern(Ue::Lit {
            value: Const::Int32(1),
        });
        let sum = exprs.intern(Ue::Add { lhs: x_ref, rhs: one });
        Program {
            name: Name::segment("sys"),
            hierarchy: StateNode::Group {
                segment: "sys".into(),
                children: vec![StateNode::Var {
                    segment: "x".into(),
                    init: Const::Int32(0),
                }],
            },
            exprs,
            rules: vec![Rule {
                id: 0,
                node: Name::segment("sys"),
                guard: None,
                assigns: vec![Assign {
                    target: x,
                    value: sum,
                }],
                chan_writes: vec![],
            }],
            channels: vec![],
            props: vec![],
        }
    }

    #[test]
    fn test_validate_accepts_minimal() {
        minimal().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let mut program = minimal();
        program.rules[0].assigns[0].target = Name::segment("sys").scope("nope");
        assert!(matches!(
            program.validate().unwrap_err(),
            ModelError::UnknownTarget { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_target() {
        let mut program = minimal();
        let dup = program.rules[0].assigns[0].clone();
        program.rules[0].assigns.push(dup);
        assert!(matches!(
            program.validate().unwrap_err(),
            ModelError::DuplicateTarget { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_dangling_hash() {
        let mut program = minimal();
        program.rules[0].guard = Some(UeHash(99));
        assert!(matches!(
            program.validate().unwrap_err(),
            ModelError::MissingExpr { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_channel_without_leaf() {
        let mut program = minimal();
        program.channels.push(ChannelDesc {
            id: 0,
            name: Name::segment("sys").scope("ghost"),
            elem: PrimType::Int8,
            writer: 0,
            reader: 1,
        });
        assert!(matches!(
            program.validate().unwrap_err(),
            ModelError::ChannelNotInHierarchy { .. }
        ));
    }

    #[test]
    fn test_used_exprs_is_transitive_closure() {
        let program = minimal();
        let used = program.used_exprs(&program.rules[0]).unwrap();
        assert_eq!(used.len(), 3);
    }
}
