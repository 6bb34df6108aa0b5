//! Property tests over randomly generated programs.
//!
//! The generator produces small but shape-diverse programs: a handful of
//! integer variables, up to two channels, and rules that assign arbitrary
//! subsets with optional guards and channel writes.

use proptest::prelude::*;
use sable_mcmt::Term;
use sable_model::{
    mangle, Assign, ChanWrite, ChannelDesc, Config, Const, Name, PrimType, Program, Rule,
    StateNode, Ue, UeMap,
};
use sable_trans::translate;
use std::collections::HashSet;

/// Per-rule shape decisions, clamped against the variable count at build
/// time.
#[derive(Debug, Clone)]
struct RuleSpec {
    guarded: bool,
    guard_var: usize,
    literal: i32,
    assign_mask: Vec<bool>,
    write_mask: Vec<bool>,
}

fn arb_rule_spec() -> impl Strategy<Value = RuleSpec> {
    (
        any::<bool>(),
        0usize..4,
        -5i32..20,
        prop::collection::vec(any::<bool>(), 4),
        prop::collection::vec(any::<bool>(), 2),
    )
        .prop_map(|(guarded, guard_var, literal, assign_mask, write_mask)| RuleSpec {
            guarded,
            guard_var,
            literal,
            assign_mask,
            write_mask,
        })
}

fn build_program(n_vars: usize, n_chans: usize, specs: Vec<RuleSpec>) -> Program {
    let sys = Name::segment("Gen");
    let mut children = Vec::new();
    for i in 0..n_vars {
        children.push(StateNode::Var {
            segment: format!("v{i}"),
            init: Const::Int32(i as i32),
        });
    }
    for c in 0..n_chans {
        children.push(StateNode::Chan {
            segment: format!("c{c}"),
            elem: PrimType::Int32,
        });
    }

    let channels = (0..n_chans)
        .map(|c| ChannelDesc {
            id: c as u32,
            name: sys.scope(&format!("c{c}")),
            elem: PrimType::Int32,
            writer: 0,
            reader: 1,
        })
        .collect();

    let mut exprs = UeMap::new();
    let var_refs: Vec<_> = (0..n_vars)
        .map(|i| {
            exprs.intern(Ue::StateVar {
                name: sys.scope(&format!("v{i}")),
            })
        })
        .collect();

    let mut rules = Vec::new();
    for (id, spec) in specs.into_iter().enumerate() {
        let lit = exprs.intern(Ue::Lit {
            value: Const::Int32(spec.literal),
        });
        let guard = spec.guarded.then(|| {
            let v = var_refs[spec.guard_var % n_vars];
            exprs.intern(Ue::Lt { lhs: v, rhs: lit })
        });
        let mut assigns = Vec::new();
        for (i, &on) in spec.assign_mask.iter().take(n_vars).enumerate() {
            if on {
                let sum = exprs.intern(Ue::Add {
                    lhs: var_refs[i],
                    rhs: lit,
                });
                assigns.push(Assign {
                    target: sys.scope(&format!("v{i}")),
                    value: sum,
                });
            }
        }
        let mut chan_writes = Vec::new();
        for (c, &on) in spec.write_mask.iter().take(n_chans).enumerate() {
            if on {
                chan_writes.push(ChanWrite {
                    chan: c as u32,
                    value: lit,
                });
            }
        }
        rules.push(Rule {
            id: id as u32,
            node: sys.scope(&format!("n{id}")),
            guard,
            assigns,
            chan_writes,
        });
    }

    Program {
        name: sys.clone(),
        hierarchy: StateNode::Group {
            segment: "Gen".into(),
            children,
        },
        exprs,
        rules,
        channels,
        props: vec![],
    }
}

fn arb_program() -> impl Strategy<Value = Program> {
    (
        1usize..=4,
        0usize..=2,
        prop::collection::vec(arb_rule_spec(), 1..=3),
    )
        .prop_map(|(n_vars, n_chans, specs)| build_program(n_vars, n_chans, specs))
}

fn conjuncts(pred: &Term) -> Vec<Term> {
    match pred {
        Term::And(cs) => cs.clone(),
        Term::True => vec![],
        other => vec![other.clone()],
    }
}

fn collect_refs(term: &Term, out: &mut Vec<Name>) {
    match term {
        Term::Ref(name) => out.push(name.clone()),
        Term::Not(t) => collect_refs(t, out),
        Term::And(ts) | Term::Or(ts) | Term::Add(ts) => {
            for t in ts {
                collect_refs(t, out);
            }
        }
        Term::Implies(a, b)
        | Term::Eq(a, b)
        | Term::Lt(a, b)
        | Term::Le(a, b)
        | Term::Sub(a, b)
        | Term::Mul(a, b) => {
            collect_refs(a, out);
            collect_refs(b, out);
        }
        Term::Ite(c, t, e) => {
            collect_refs(c, out);
            collect_refs(t, out);
            collect_refs(e, out);
        }
        Term::Let(bindings, body) => {
            for (_, value) in bindings {
                collect_refs(value, out);
            }
            collect_refs(body, out);
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    // State-type variable set is exactly hierarchy + channel fields + fault
    // inputs, without duplicates.
    #[test]
    fn state_type_covers_model_without_duplicates(program in arb_program()) {
        let file = translate(&program, &Config::default()).unwrap();

        let mut expected: Vec<Name> = Vec::new();
        for leaf in program.hierarchy.leaves() {
            match leaf {
                sable_model::StateLeaf::Var { name, .. } => expected.push(name),
                sable_model::StateLeaf::Chan { name, .. } => {
                    expected.push(name.scope("var"));
                    expected.push(name.scope("ready"));
                }
            }
        }
        let got: Vec<Name> = file.state_type.state_vars.iter().map(|(n, _)| n.clone()).collect();
        prop_assert_eq!(got, expected);

        let mut inputs: Vec<Name> = program.channels.iter().map(|c| c.fault_value_name()).collect();
        inputs.extend(program.rules.iter().map(|r| r.fault_input_name()));
        let got_inputs: Vec<Name> =
            file.state_type.input_vars.iter().map(|(n, _)| n.clone()).collect();
        prop_assert_eq!(&got_inputs, &inputs);

        let all: HashSet<&Name> = file
            .state_type
            .state_vars
            .iter()
            .chain(file.state_type.input_vars.iter())
            .map(|(n, _)| n)
            .collect();
        prop_assert_eq!(all.len(), file.state_type.state_vars.len() + got_inputs.len());
    }

    // Every transition constrains next.* for exactly the full variable set.
    #[test]
    fn frame_covers_everything(program in arb_program()) {
        let file = translate(&program, &Config::default()).unwrap();
        let mut expected: Vec<Name> = file
            .state_type
            .state_vars
            .iter()
            .chain(file.state_type.input_vars.iter())
            .map(|(n, _)| n.clone())
            .collect();
        expected.sort();

        for t in &file.transitions {
            let mut targets: Vec<Name> = Vec::new();
            for c in conjuncts(&t.pred) {
                if let Term::Eq(lhs, _) = c {
                    if let Term::Next(name) = *lhs {
                        targets.push(name);
                    }
                }
            }
            targets.sort();
            prop_assert_eq!(&targets, &expected, "transition {}", t.name);
        }
    }

    // Let bindings only reference earlier bindings.
    #[test]
    fn lets_are_topologically_ordered(program in arb_program()) {
        let file = translate(&program, &Config::default()).unwrap();
        for t in &file.transitions {
            let mut bound: HashSet<Name> = HashSet::new();
            for (name, value) in &t.lets {
                let mut refs = Vec::new();
                collect_refs(value, &mut refs);
                for r in refs {
                    prop_assert!(bound.contains(&r), "{} used before binding in {}", r, t.name);
                }
                bound.insert(name.clone());
            }
        }
    }

    // The master transition disjoins exactly the per-rule transitions.
    #[test]
    fn master_disjoins_all_rules(program in arb_program()) {
        let file = translate(&program, &Config::default()).unwrap();
        let expected: Vec<Term> = program
            .rules
            .iter()
            .map(|r| Term::Ref(program.name.suffix("transition").suffix(&r.id.to_string())))
            .collect();
        let got = match &file.master.pred {
            Term::Or(ds) => ds.clone(),
            single => vec![single.clone()],
        };
        prop_assert_eq!(got, expected);
    }

    // Initial state lists variables in state-type order.
    #[test]
    fn init_order_matches_state_type(program in arb_program()) {
        let file = translate(&program, &Config::default()).unwrap();
        let mut init_names: Vec<Name> = Vec::new();
        for c in conjuncts(&file.init.pred) {
            if let Term::Eq(lhs, _) = c {
                if let Term::State(name) = *lhs {
                    init_names.push(name);
                }
            }
        }
        let type_names: Vec<Name> =
            file.state_type.state_vars.iter().map(|(n, _)| n.clone()).collect();
        prop_assert_eq!(init_names, type_names);
    }

    // Translation output is a pure function of its input.
    #[test]
    fn translation_is_deterministic(program in arb_program()) {
        let a = translate(&program, &Config::default()).unwrap();
        let b = translate(&program, &Config::default()).unwrap();
        prop_assert_eq!(&a, &b);
        let ra = sable_mcmt::render(&a, false);
        let rb = sable_mcmt::render(&b, false);
        prop_assert_eq!(ra, rb);
    }

    // Dot-to-bang rewriting is idempotent.
    #[test]
    fn mangling_is_idempotent(s in ".{0,40}") {
        let once = mangle(&s);
        prop_assert_eq!(mangle(&once), once.clone());
    }
}
