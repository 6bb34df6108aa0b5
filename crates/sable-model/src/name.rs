//! Hierarchical names for state variables, channels, and declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A hierarchical name.
///
/// Built from segments with two combinators: [`Name::scope`] joins with `!`
/// (nesting within one system) and [`Name::suffix`] joins with `_` (deriving
/// declaration names from a base). Rendering is deterministic, and two names
/// are equal exactly when their rendered forms are equal.
///
/// Dots are not representable: any `.` in an input segment is rewritten to
/// `!` on construction. The downstream checker namespaces state fields as
/// `state.x` / `next.x`, so a dot surviving inside an identifier would change
/// its meaning there.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// A single-segment name.
    pub fn segment(seg: &str) -> Self {
        Name(mangle(seg))
    }

    /// `self!child`.
    pub fn scope(&self, child: &str) -> Self {
        Name(format!("{}!{}", self.0, mangle(child)))
    }

    /// `self_tag`.
    pub fn suffix(&self, tag: &str) -> Self {
        Name(format!("{}_{}", self.0, mangle(tag)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rewrite every `.` to `!`. Idempotent: applying it twice equals applying
/// it once.
pub fn mangle(s: &str) -> String {
    s.replace('.', "!")
}
