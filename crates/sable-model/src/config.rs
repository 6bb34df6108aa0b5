//! Translator configuration and the fault model.

use crate::Name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fault class of a node, per the hybrid fault taxonomy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FaultClass {
    NonFaulty,
    ManifestFaulty,
    SymmetricFaulty,
    ByzantineFaulty,
}

impl FaultClass {
    pub const ALL: [FaultClass; 4] = [
        FaultClass::NonFaulty,
        FaultClass::ManifestFaulty,
        FaultClass::SymmetricFaulty,
        FaultClass::ByzantineFaulty,
    ];

    /// Integer encoding used for per-node fault inputs.
    pub fn encode(self) -> i64 {
        match self {
            FaultClass::NonFaulty => 0,
            FaultClass::ManifestFaulty => 1,
            FaultClass::SymmetricFaulty => 2,
            FaultClass::ByzantineFaulty => 3,
        }
    }
}

/// How node failures are modeled in the emitted system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FaultModel {
    /// Every node behaves; the assumptions formula is vacuous.
    NoFaults,
    /// Each node nondeterministically takes a class; the weighted count of
    /// faulty nodes is bounded globally.
    Hybrid {
        weights: BTreeMap<FaultClass, u32>,
        bound: i64,
    },
    /// Every listed node is pinned to a class; unlisted nodes are
    /// non-faulty.
    Fixed { map: BTreeMap<Name, FaultClass> },
}

impl Default for FaultModel {
    fn default() -> Self {
        FaultModel::NoFaults
    }
}

/// Translator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Emit comment headers in the rendered output. Never affects the
    /// semantic content.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub fault_model: FaultModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_encoding_is_dense() {
        let codes: Vec<i64> = FaultClass::ALL.iter().map(|c| c.encode()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_default_is_no_faults() {
        assert_eq!(Config::default().fault_model, FaultModel::NoFaults);
    }
}
