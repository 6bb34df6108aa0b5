//! AST for the MCMT transition-system format.
//!
//! MCMT is a LISP-style superset of SMT-LIB with `define-state-type`,
//! `define-states`, `define-transition`, `define-transition-system`, and
//! `query` forms. This crate defines the abstract syntax the translator
//! produces; [`render`] serializes it to text. No I/O happens here.

mod pretty;

pub use pretty::render;

use sable_model::Name;
use std::fmt;

/// Base sort of a state or input variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Bool,
    Int,
    Real,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => f.write_str("Bool"),
            Sort::Int => f.write_str("Int"),
            Sort::Real => f.write_str("Real"),
        }
    }
}

/// A term of the MCMT expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    True,
    False,
    Int(i64),
    Real(f64),
    /// `state.x` — a field of the current state.
    State(Name),
    /// `next.x` — a field of the next state.
    Next(Name),
    /// A bare identifier: a let-bound temporary or a named formula or
    /// transition.
    Ref(Name),
    Not(Box<Term>),
    And(Vec<Term>),
    Or(Vec<Term>),
    Implies(Box<Term>, Box<Term>),
    Eq(Box<Term>, Box<Term>),
    Lt(Box<Term>, Box<Term>),
    Le(Box<Term>, Box<Term>),
    Add(Vec<Term>),
    Sub(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Ite(Box<Term>, Box<Term>, Box<Term>),
    Let(Vec<LetBinding>, Box<Term>),
}

/// One binding of a `let` form.
pub type LetBinding = (Name, Term);

impl Term {
    /// N-ary conjunction with the usual flattening: literal `true`s are
    /// dropped, nested `and`s inlined, singletons unwrapped. Empty is
    /// `true`.
    pub fn and(terms: Vec<Term>) -> Term {
        let mut flat = Vec::new();
        for t in terms {
            match t {
                Term::True => {}
                Term::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Term::True,
            1 => flat.pop().expect("len checked"),
            _ => Term::And(flat),
        }
    }

    /// N-ary disjunction; drops literal `false`s, inlines nested `or`s,
    /// unwraps singletons. Empty is `false`.
    pub fn or(terms: Vec<Term>) -> Term {
        let mut flat = Vec::new();
        for t in terms {
            match t {
                Term::False => {}
                Term::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Term::False,
            1 => flat.pop().expect("len checked"),
            _ => Term::Or(flat),
        }
    }

    pub fn not(t: Term) -> Term {
        Term::Not(Box::new(t))
    }

    pub fn eq(lhs: Term, rhs: Term) -> Term {
        Term::Eq(Box::new(lhs), Box::new(rhs))
    }

    pub fn implies(lhs: Term, rhs: Term) -> Term {
        Term::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn le(lhs: Term, rhs: Term) -> Term {
        Term::Le(Box::new(lhs), Box::new(rhs))
    }
}

/// `define-constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDef {
    pub name: Name,
    pub value: Term,
}

/// `define-state-type`: named lists of state fields and input fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StateType {
    pub name: Name,
    pub state_vars: Vec<(Name, Sort)>,
    pub input_vars: Vec<(Name, Sort)>,
}

/// `define-states`: a named predicate over a single state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateFormula {
    pub name: Name,
    pub state_type: Name,
    pub pred: Term,
}

/// `define-transition`: a named predicate over a state pair, with its let
/// bindings kept separate so renderers and tests can inspect them in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub name: Name,
    pub state_type: Name,
    pub lets: Vec<LetBinding>,
    pub pred: Term,
}

/// `define-transition-system`.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    pub name: Name,
    pub state_type: Name,
    pub init: Name,
    pub transition: Name,
}

/// `query`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Property name; surfaces as a comment in debug renderings.
    pub name: String,
    pub system: Name,
    pub pred: Term,
}

/// A complete emitted file, in rendering order.
#[derive(Debug, Clone, PartialEq)]
pub struct McmtFile {
    pub consts: Vec<ConstDef>,
    pub state_type: StateType,
    pub init: StateFormula,
    pub assumptions: StateFormula,
    pub transitions: Vec<Transition>,
    pub master: Transition,
    pub system: System,
    pub queries: Vec<Query>,
}
