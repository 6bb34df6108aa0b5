//! Fault-model instrumentation: input variables and the assumptions formula.

use crate::transition::{assumptions_name, state_type_name};
use crate::{TransError, TransResult};
use sable_mcmt::{Sort, StateFormula, Term};
use sable_model::{ChannelDesc, FaultClass, FaultModel, Name, Program, Rule};
use std::collections::{BTreeMap, HashSet};

/// Input variables appended to the state type.
///
/// One Boolean per channel (a nondeterministically corrupted payload) in
/// channel-id order, then one input per rule in rule-id order. Under
/// `NoFaults` the per-node input stays Boolean and unconstrained; under
/// `Hybrid` and `Fixed` it is an Int carrying the node's fault class.
pub fn fault_inputs(program: &Program, model: &FaultModel) -> Vec<(Name, Sort)> {
    let node_sort = match model {
        FaultModel::NoFaults => Sort::Bool,
        FaultModel::Hybrid { .. } | FaultModel::Fixed { .. } => Sort::Int,
    };

    let mut inputs = Vec::new();
    for chan in channels_by_id(program) {
        inputs.push((chan.fault_value_name(), Sort::Bool));
    }
    for rule in rules_by_id(program) {
        inputs.push((rule.fault_input_name(), node_sort));
    }
    inputs
}

/// The assumptions formula consumed by generated queries. Fault modeling
/// never changes the per-rule transition predicates, only this formula and
/// the input-variable set.
pub fn assumptions(program: &Program, model: &FaultModel) -> TransResult<StateFormula> {
    let pred = match model {
        FaultModel::NoFaults => Term::True,
        FaultModel::Hybrid { weights, bound } => hybrid_assumption(program, weights, *bound),
        FaultModel::Fixed { map } => fixed_assumption(program, map)?,
    };
    Ok(StateFormula {
        name: assumptions_name(&program.name),
        state_type: state_type_name(&program.name),
        pred,
    })
}

/// Each per-node class input ranges over the four classes, and the weighted
/// count of nodes per class stays within the global bound.
fn hybrid_assumption(program: &Program, weights: &BTreeMap<FaultClass, u32>, bound: i64) -> Term {
    let mut conjuncts = Vec::new();
    let mut weighted = Vec::new();
    for rule in rules_by_id(program) {
        let class = Term::State(rule.fault_input_name());
        conjuncts.push(Term::le(Term::Int(0), class.clone()));
        conjuncts.push(Term::le(class.clone(), Term::Int(3)));
        weighted.push(class_weight(&class, weights));
    }
    if !weighted.is_empty() {
        conjuncts.push(Term::le(Term::Add(weighted), Term::Int(bound)));
    }
    Term::and(conjuncts)
}

/// Selects the weight of the class a node's input carries:
/// `(ite (= c 0) w0 (ite (= c 1) w1 (ite (= c 2) w2 w3)))`.
fn class_weight(class: &Term, weights: &BTreeMap<FaultClass, u32>) -> Term {
    let weight_of =
        |c: FaultClass| Term::Int(weights.get(&c).copied().unwrap_or(0) as i64);
    let mut term = weight_of(FaultClass::ByzantineFaulty);
    for c in [
        FaultClass::SymmetricFaulty,
        FaultClass::ManifestFaulty,
        FaultClass::NonFaulty,
    ] {
        term = Term::Ite(
            Box::new(Term::eq(class.clone(), Term::Int(c.encode()))),
            Box::new(weight_of(c)),
            Box::new(term),
        );
    }
    term
}

/// Pins every node's class input: mapped nodes to their class, the rest to
/// non-faulty. A map entry naming an unknown node is a configuration error.
fn fixed_assumption(program: &Program, map: &BTreeMap<Name, FaultClass>) -> TransResult<Term> {
    let known: HashSet<&Name> = program.rules.iter().map(|r| &r.node).collect();
    for name in map.keys() {
        if !known.contains(name) {
            return Err(TransError::UnknownFaultNode { name: name.clone() });
        }
    }

    let mut conjuncts = Vec::new();
    for rule in rules_by_id(program) {
        let class = map
            .get(&rule.node)
            .copied()
            .unwrap_or(FaultClass::NonFaulty);
        conjuncts.push(Term::eq(
            Term::State(rule.fault_input_name()),
            Term::Int(class.encode()),
        ));
    }
    Ok(Term::and(conjuncts))
}

fn channels_by_id(program: &Program) -> Vec<&ChannelDesc> {
    let mut chans: Vec<&ChannelDesc> = program.channels.iter().collect();
    chans.sort_by_key(|c| c.id);
    chans
}

fn rules_by_id(program: &Program) -> Vec<&Rule> {
    let mut rules: Vec<&Rule> = program.rules.iter().collect();
    rules.sort_by_key(|r| r.id);
    rules
}
