//! Elaborated-program data model for the sable translator.
//!
//! An external elaborator flattens the user-facing modeling language into the
//! structures defined here: a state hierarchy (rose tree of groups, state
//! variables, and channels), a flat list of guarded rules, a list of channel
//! descriptors, and a content-addressed expression DAG. The whole model
//! derives serde, so elaborators living in other processes can hand the
//! translator a JSON file.

mod config;
mod hierarchy;
mod name;
mod program;
mod types;
mod uemap;

pub use config::{Config, FaultClass, FaultModel};
pub use hierarchy::{StateLeaf, StateNode};
pub use name::{mangle, Name};
pub use program::{Assign, ChanWrite, ChannelDesc, Program, Prop, Rule};
pub use types::{Const, PrimType};
pub use uemap::{Ue, UeHash, UeMap};

use thiserror::Error;

/// Violation of an invariant the elaborator is supposed to guarantee.
///
/// Any of these reaching the translator means the producing elaborator is
/// buggy; none of them is recoverable.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate sibling segment '{segment}' under '{parent}'")]
    DuplicateSibling { parent: String, segment: String },

    #[error("expression {hash} is not in the expression map")]
    MissingExpr { hash: UeHash },

    #[error("expression graph has a cycle through {hash}")]
    CyclicExpr { hash: UeHash },

    #[error("expression references unknown state variable '{name}'")]
    UnknownVarRef { name: Name },

    #[error("rule {rule}: assignment target '{target}' is not a state variable")]
    UnknownTarget { rule: u32, target: Name },

    #[error("rule {rule}: state variable '{target}' assigned more than once")]
    DuplicateTarget { rule: u32, target: Name },

    #[error("channel id {chan} is not declared")]
    UnknownChannel { chan: u32 },

    #[error("channel {id} ('{name}') has no leaf in the state hierarchy")]
    ChannelNotInHierarchy { id: u32, name: Name },

    #[error("duplicate rule id {id}")]
    DuplicateRuleId { id: u32 },

    #[error("duplicate channel id {id}")]
    DuplicateChannelId { id: u32 },
}

pub type ModelResult<T> = Result<T, ModelError>;
