//! Initial-state predicate, per-rule transitions, and the master transition.

use crate::expr::{lower_lets, temp_name};
use crate::layout::StateLayout;
use crate::lower::{default_term, lower_const};
use crate::TransResult;
use sable_mcmt::{StateFormula, System, Term, Transition};
use sable_model::{ModelError, Name, Program, Rule, StateLeaf};
use std::collections::HashSet;

pub fn state_type_name(system: &Name) -> Name {
    system.suffix("state_type")
}

pub fn initial_state_name(system: &Name) -> Name {
    system.suffix("initial_state")
}

pub fn master_transition_name(system: &Name) -> Name {
    system.suffix("transition")
}

pub fn rule_transition_name(system: &Name, rule_id: u32) -> Name {
    master_transition_name(system).suffix(&rule_id.to_string())
}

pub fn assumptions_name(system: &Name) -> Name {
    system.suffix("assumptions")
}

pub fn system_decl_name(system: &Name) -> Name {
    system.suffix("transition_system")
}

/// The initial-state predicate: one equality per state variable, walking the
/// hierarchy in the same order as the state type. Channels start empty with
/// a type-default payload. An empty hierarchy yields `true`.
pub fn init_formula(program: &Program) -> StateFormula {
    let mut conjuncts = Vec::new();
    for leaf in program.hierarchy.leaves() {
        match leaf {
            StateLeaf::Var { name, init } => {
                conjuncts.push(Term::eq(Term::State(name), lower_const(&init)));
            }
            StateLeaf::Chan { name, elem } => {
                conjuncts.push(Term::eq(Term::State(name.scope("var")), default_term(elem)));
                conjuncts.push(Term::eq(Term::State(name.scope("ready")), Term::False));
            }
        }
    }
    StateFormula {
        name: initial_state_name(&program.name),
        state_type: state_type_name(&program.name),
        pred: Term::and(conjuncts),
    }
}

/// Lower one rule to its transition predicate.
///
/// Assignments and channel writes constrain the next-state fields they
/// touch; every other field in the layout gets a frame condition, fault
/// inputs included. The guard joins as a final conjunct referencing its let
/// variable.
pub fn rule_transition(
    program: &Program,
    rule: &Rule,
    layout: &StateLayout,
) -> TransResult<Transition> {
    let lets = lower_lets(program, rule.roots())?;

    let mut assigned: Vec<(Name, Term)> = Vec::new();
    for assign in &rule.assigns {
        assigned.push((assign.target.clone(), Term::Ref(temp_name(assign.value))));
    }
    for write in &rule.chan_writes {
        let chan = program
            .channel(write.chan)
            .ok_or(ModelError::UnknownChannel { chan: write.chan })?;
        assigned.push((chan.value_name(), Term::Ref(temp_name(write.value))));
        assigned.push((chan.ready_name(), Term::True));
    }

    let assigned_names: HashSet<&Name> = assigned.iter().map(|(name, _)| name).collect();

    let mut conjuncts = Vec::new();
    for (name, value) in &assigned {
        conjuncts.push(Term::eq(Term::Next(name.clone()), value.clone()));
    }
    for (name, _) in layout.all_vars() {
        if !assigned_names.contains(name) {
            conjuncts.push(Term::eq(Term::Next(name.clone()), Term::State(name.clone())));
        }
    }
    if let Some(guard) = rule.guard {
        conjuncts.push(Term::Ref(temp_name(guard)));
    }

    Ok(Transition {
        name: rule_transition_name(&program.name, rule.id),
        state_type: state_type_name(&program.name),
        lets,
        pred: Term::and(conjuncts),
    })
}

/// The master transition: a disjunction of references to every per-rule
/// transition. No let bindings. A program with no rules yields `false`.
pub fn master_transition(program: &Program) -> Transition {
    let disjuncts = program
        .rules
        .iter()
        .map(|rule| Term::Ref(rule_transition_name(&program.name, rule.id)))
        .collect();
    Transition {
        name: master_transition_name(&program.name),
        state_type: state_type_name(&program.name),
        lets: Vec::new(),
        pred: Term::or(disjuncts),
    }
}

pub fn system_decl(program: &Program) -> System {
    System {
        name: system_decl_name(&program.name),
        state_type: state_type_name(&program.name),
        init: initial_state_name(&program.name),
        transition: master_transition_name(&program.name),
    }
}
