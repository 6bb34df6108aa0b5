//! The state hierarchy: a rose tree of groups, state variables, and channels.

use crate::{Const, ModelError, ModelResult, Name, PrimType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One node of the state hierarchy.
///
/// The fully qualified name of a leaf is the `!`-join of the segments on its
/// root-to-leaf path. No two siblings may share a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StateNode {
    /// Interior node carrying a scope segment.
    Group {
        segment: String,
        children: Vec<StateNode>,
    },
    /// A state variable with its initial value.
    Var { segment: String, init: Const },
    /// A one-slot channel carrying values of the element type.
    Chan { segment: String, elem: PrimType },
}

/// A leaf of the hierarchy paired with its fully qualified name.
#[derive(Debug, Clone, PartialEq)]
pub enum StateLeaf {
    Var { name: Name, init: Const },
    Chan { name: Name, elem: PrimType },
}

impl StateLeaf {
    pub fn name(&self) -> &Name {
        match self {
            StateLeaf::Var { name, .. } | StateLeaf::Chan { name, .. } => name,
        }
    }
}

impl StateNode {
    pub fn segment(&self) -> &str {
        match self {
            StateNode::Group { segment, .. }
            | StateNode::Var { segment, .. }
            | StateNode::Chan { segment, .. } => segment,
        }
    }

    /// Collect leaves in pre-order, qualifying each with the path from the
    /// root. The traversal carries the parent name as an accumulator.
    pub fn leaves(&self) -> Vec<StateLeaf> {
        let mut out = Vec::new();
        self.collect(None, &mut out);
        out
    }

    fn collect(&self, parent: Option<&Name>, out: &mut Vec<StateLeaf>) {
        let name = match parent {
            Some(p) => p.scope(self.segment()),
            None => Name::segment(self.segment()),
        };
        match self {
            StateNode::Group { children, .. } => {
                for child in children {
                    child.collect(Some(&name), out);
                }
            }
            StateNode::Var { init, .. } => out.push(StateLeaf::Var { name, init: *init }),
            StateNode::Chan { elem, .. } => out.push(StateLeaf::Chan { name, elem: *elem }),
        }
    }

    /// Check that no two siblings share a segment, anywhere in the tree.
    pub fn check_sibling_names(&self) -> ModelResult<()> {
        if let StateNode::Group { segment, children } = self {
            let mut seen = HashSet::new();
            for child in children {
                if !seen.insert(child.segment()) {
                    return Err(ModelError::DuplicateSibling {
                        parent: segment.clone(),
                        segment: child.segment().to_string(),
                    });
                }
                child.check_sibling_names()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateNode {
        StateNode::Group {
            segment: "sys".into(),
            children: vec![
                StateNode::Var {
                    segment: "flag".into(),
                    init: Const::Bool(false),
                },
                StateNode::Group {
                    segment: "node".into(),
                    children: vec![
                        StateNode::Var {
                            segment: "x".into(),
                            init: Const::Int32(0),
                        },
                        StateNode::Chan {
                            segment: "out".into(),
                            elem: PrimType::Int64,
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_leaves_preorder_qualified() {
        let names: Vec<String> = sample()
            .leaves()
            .iter()
            .map(|l| l.name().to_string())
            .collect();
        assert_eq!(names, vec!["sys!flag", "sys!node!x", "sys!node!out"]);
    }

    #[test]
    fn test_duplicate_sibling_rejected() {
        let tree = StateNode::Group {
            segment: "sys".into(),
            children: vec![
                StateNode::Var {
                    segment: "x".into(),
                    init: Const::Bool(false),
                },
                StateNode::Chan {
                    segment: "x".into(),
                    elem: PrimType::Int8,
                },
            ],
        };
        let err = tree.check_sibling_names().unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSibling { .. }));
    }

    #[test]
    fn test_duplicate_in_nested_group_rejected() {
        let tree = StateNode::Group {
            segment: "sys".into(),
            children: vec![StateNode::Group {
                segment: "n".into(),
                children: vec![
                    StateNode::Var {
                        segment: "y".into(),
                        init: Const::Int8(0),
                    },
                    StateNode::Var {
                        segment: "y".into(),
                        init: Const::Int8(1),
                    },
                ],
            }],
        };
        assert!(tree.check_sibling_names().is_err());
    }
}
