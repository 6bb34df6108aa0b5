//! Translator from the elaborated model to an MCMT transition system.
//!
//! A pure batch transformation: the input program is only read, the output
//! AST is freshly built, and nothing is emitted on error. Failure is always
//! fail-fast because the downstream checker cannot soundly consume a partial
//! transition system.

pub mod expr;
pub mod fault;
pub mod layout;
pub mod lower;
pub mod transition;

use sable_mcmt::{McmtFile, Query, Term};
use sable_model::{Config, ModelError, Name, Program};
use thiserror::Error;
use tracing::debug;

/// Translation error. None of these are recoverable and none leave partial
/// output behind.
#[derive(Debug, Error)]
pub enum TransError {
    /// The program uses a construct with no MCMT lowering.
    #[error("unsupported construct: {feature}")]
    Unsupported { feature: String },

    /// An elaborator-guaranteed invariant does not hold.
    #[error("invariant violation: {0}")]
    Invariant(#[from] ModelError),

    /// The fixed-fault map names a node the program does not have.
    #[error("fault map refers to unknown node '{name}'")]
    UnknownFaultNode { name: Name },
}

pub type TransResult<T> = Result<T, TransError>;

/// Translate an elaborated program into a complete MCMT file.
pub fn translate(program: &Program, config: &Config) -> TransResult<McmtFile> {
    program.validate()?;
    debug!(
        system = %program.name,
        rules = program.rules.len(),
        channels = program.channels.len(),
        "translating"
    );

    let layout = layout::StateLayout::build(program, &config.fault_model);
    let state_type = layout.to_state_type(transition::state_type_name(&program.name));
    let init = transition::init_formula(program);
    let assumptions = fault::assumptions(program, &config.fault_model)?;

    let transitions = program
        .rules
        .iter()
        .map(|rule| transition::rule_transition(program, rule, &layout))
        .collect::<TransResult<Vec<_>>>()?;
    let master = transition::master_transition(program);
    let system = transition::system_decl(program);

    let queries = program
        .props
        .iter()
        .map(|prop| {
            let body = expr::lower_inline(program, prop.body)?;
            Ok(Query {
                name: prop.name.clone(),
                system: system.name.clone(),
                pred: Term::implies(Term::Ref(assumptions.name.clone()), body),
            })
        })
        .collect::<TransResult<Vec<_>>>()?;

    debug!(
        state_vars = state_type.state_vars.len(),
        input_vars = state_type.input_vars.len(),
        transitions = transitions.len(),
        queries = queries.len(),
        "translation complete"
    );

    Ok(McmtFile {
        consts: Vec::new(),
        state_type,
        init,
        assumptions,
        transitions,
        master,
        system,
        queries,
    })
}
