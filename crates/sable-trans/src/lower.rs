//! Primitive type and constant lowering.

use sable_mcmt::{Sort, Term};
use sable_model::{Const, PrimType};

/// Lower a primitive type to its MCMT sort.
///
/// Every integer type, signed or unsigned, widens to the unbounded `Int`
/// sort: wrap-around and unsigned comparison against the source domain are
/// not preserved. `Float` and `Double` lower to `Real`.
pub fn lower_type(ty: PrimType) -> Sort {
    match ty {
        PrimType::Bool => Sort::Bool,
        PrimType::Int8
        | PrimType::Int16
        | PrimType::Int32
        | PrimType::Int64
        | PrimType::Word8
        | PrimType::Word16
        | PrimType::Word32
        | PrimType::Word64 => Sort::Int,
        PrimType::Float | PrimType::Double => Sort::Real,
    }
}

/// Lower a literal to a term. Word values are interpreted within `i64`.
pub fn lower_const(c: &Const) -> Term {
    match c {
        Const::Bool(true) => Term::True,
        Const::Bool(false) => Term::False,
        Const::Int8(v) => Term::Int(*v as i64),
        Const::Int16(v) => Term::Int(*v as i64),
        Const::Int32(v) => Term::Int(*v as i64),
        Const::Int64(v) => Term::Int(*v),
        Const::Word8(v) => Term::Int(*v as i64),
        Const::Word16(v) => Term::Int(*v as i64),
        Const::Word32(v) => Term::Int(*v as i64),
        Const::Word64(v) => Term::Int(*v as i64),
        Const::Float(v) => Term::Real(*v as f64),
        Const::Double(v) => Term::Real(*v),
    }
}

/// Default value of a type: `false`, `0`, or `0.0`. Channels initialize
/// their payload to this.
pub fn default_term(ty: PrimType) -> Term {
    match lower_type(ty) {
        Sort::Bool => Term::False,
        Sort::Int => Term::Int(0),
        Sort::Real => Term::Real(0.0),
    }
}
