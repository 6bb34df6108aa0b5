//! Expression lowering: the interned DAG into let-bound MCMT terms.

use crate::lower::lower_const;
use crate::{TransError, TransResult};
use sable_mcmt::{LetBinding, Term};
use sable_model::{ModelError, Name, Program, Ue, UeHash};

/// Let-variable bound to an interned expression inside one transition.
pub fn temp_name(h: UeHash) -> Name {
    Name::segment("temp").scope(&h.to_string())
}

/// Lower every expression reachable from `roots` into one let binding per
/// node. Operands precede their users; ties break by ascending handle, so
/// the binding order is stable across runs.
pub fn lower_lets(program: &Program, roots: Vec<UeHash>) -> TransResult<Vec<LetBinding>> {
    let reachable = program.exprs.reachable(roots)?;
    let order = program.exprs.topo_sort(&reachable)?;
    order
        .into_iter()
        .map(|h| {
            let ue = program.exprs.lookup(h)?;
            let term = lower_node(program, ue, &mut |op| Ok(Term::Ref(temp_name(op))))?;
            Ok((temp_name(h), term))
        })
        .collect()
}

/// Lower a single root to a self-contained term, inlining operands instead
/// of let-binding them. Used for query bodies, which are small and read
/// better without a binding list.
pub fn lower_inline(program: &Program, root: UeHash) -> TransResult<Term> {
    let ue = program.exprs.lookup(root)?;
    lower_node(program, ue, &mut |op| lower_inline(program, op))
}

fn unsupported<T>(feature: impl Into<String>) -> TransResult<T> {
    Err(TransError::Unsupported {
        feature: feature.into(),
    })
}

/// Translate one node, resolving operand handles through `resolve`.
fn lower_node(
    program: &Program,
    ue: &Ue,
    resolve: &mut dyn FnMut(UeHash) -> TransResult<Term>,
) -> TransResult<Term> {
    match ue {
        Ue::StateVar { name } => Ok(Term::State(name.clone())),
        Ue::ChanValue { chan } => Ok(Term::State(
            program
                .channel(*chan)
                .ok_or(ModelError::UnknownChannel { chan: *chan })?
                .value_name(),
        )),
        Ue::ChanReady { chan } => Ok(Term::State(
            program
                .channel(*chan)
                .ok_or(ModelError::UnknownChannel { chan: *chan })?
                .ready_name(),
        )),
        Ue::Lit { value } => Ok(lower_const(value)),

        Ue::Not { arg } => Ok(Term::not(resolve(*arg)?)),
        Ue::And { args } => {
            let terms = args.iter().map(|&a| resolve(a)).collect::<TransResult<_>>()?;
            Ok(Term::and(terms))
        }
        Ue::Or { args } => {
            let terms = args.iter().map(|&a| resolve(a)).collect::<TransResult<_>>()?;
            Ok(Term::or(terms))
        }
        Ue::Add { lhs, rhs } => Ok(Term::Add(vec![resolve(*lhs)?, resolve(*rhs)?])),
        Ue::Sub { lhs, rhs } => Ok(Term::Sub(
            Box::new(resolve(*lhs)?),
            Box::new(resolve(*rhs)?),
        )),
        Ue::Mul { lhs, rhs } => Ok(Term::Mul(
            Box::new(resolve(*lhs)?),
            Box::new(resolve(*rhs)?),
        )),
        Ue::Eq { lhs, rhs } => Ok(Term::eq(resolve(*lhs)?, resolve(*rhs)?)),
        Ue::Lt { lhs, rhs } => Ok(Term::Lt(
            Box::new(resolve(*lhs)?),
            Box::new(resolve(*rhs)?),
        )),
        Ue::Le { lhs, rhs } => Ok(Term::le(resolve(*lhs)?, resolve(*rhs)?)),
        Ue::Mux {
            cond,
            on_true,
            on_false,
        } => Ok(Term::Ite(
            Box::new(resolve(*cond)?),
            Box::new(resolve(*on_true)?),
            Box::new(resolve(*on_false)?),
        )),

        Ue::Div { .. } => unsupported("division"),
        Ue::Mod { .. } => unsupported("modulus"),
        Ue::BitAnd { .. } => unsupported("bitwise and"),
        Ue::BitOr { .. } => unsupported("bitwise or"),
        Ue::BitXor { .. } => unsupported("bitwise xor"),
        Ue::BitNot { .. } => unsupported("bitwise complement"),
        Ue::Shl { .. } => unsupported("shift left"),
        Ue::Shr { .. } => unsupported("shift right"),
        Ue::IntToReal { .. } => unsupported("cast from integer to real"),
        Ue::RealToInt { .. } => unsupported("cast from real to integer"),
        Ue::MathFn { func, .. } => unsupported(format!("math function '{}'", func)),
        Ue::ArrayIndex { array, .. } => unsupported(format!("array indexing ('{}')", array)),
        Ue::ExternVar { name } => unsupported(format!("external variable '{}'", name)),
    }
}
