//! Conversion ranks.
//!
//! Every conversion the checker considers is classified by a [`CastRank`].
//! The ranks are ordered from worst to best, so combining several
//! constraints is simply taking the minimum: an operation is only as safe as
//! its weakest conversion.
//!
//! ## Primitive promotion
//!
//! ```text
//! bool(0) < char(1) < int(2) < real(3)
//! ```
//!
//! Moving up the order is `Implicit`, moving down is `Unintended`.

use crate::ops::{BinaryOp, OpClass, UnaryOp};

use super::{FuncType, Type};

/// How safe a conversion is, from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CastRank {
    /// Forbidden.
    None,
    /// Only with an explicit cast, never inserted implicitly.
    Explicit,
    /// Allowed but flagged, likely loses precision or is surprising.
    Unintended,
    /// Always safe, inserted silently.
    Implicit,
}

impl CastRank {
    /// The weakest rank of a set of constraints; `Implicit` when there are none.
    pub fn weakest(ranks: impl IntoIterator<Item = CastRank>) -> CastRank {
        ranks.into_iter().min().unwrap_or(CastRank::Implicit)
    }

    /// Keep `Implicit`, collapse everything else to `None`.
    pub fn strict(self) -> CastRank {
        if self == CastRank::Implicit {
            CastRank::Implicit
        } else {
            CastRank::None
        }
    }
}

/// Classify the conversion from `from` to `to`.
pub fn can_cast(from: &Type, to: &Type) -> CastRank {
    if let (Some(from_rank), Some(to_rank)) = (from.promotion_rank(), to.promotion_rank()) {
        return if to_rank >= from_rank {
            CastRank::Implicit
        } else {
            CastRank::Unintended
        };
    }

    match (from, to) {
        (Type::Array(src), Type::Array(dst)) => {
            if src.base != dst.base {
                return CastRank::None;
            }
            match (src.size, dst.size) {
                (_, None) => CastRank::Implicit,
                (Some(have), Some(need)) if have >= need => CastRank::Implicit,
                (Some(_), Some(_)) => CastRank::None,
                // Open source into a bounded target: length only known at run time.
                (None, Some(_)) => CastRank::Explicit,
            }
        }
        (Type::Func(_), Type::Func(_))
        | (Type::Struct(_), Type::Struct(_))
        | (Type::Union(_), Type::Union(_)) => {
            if from == to {
                CastRank::Implicit
            } else {
                CastRank::Explicit
            }
        }
        _ => CastRank::None,
    }
}

/// Like [`can_cast`], for a source that may produce no value at all.
pub fn can_cast_value(from: Option<&Type>, to: &Type) -> CastRank {
    from.map_or(CastRank::None, |from| can_cast(from, to))
}

/// The higher-ranked of two primitive types.
pub fn num_promote(a: &Type, b: &Type) -> Option<Type> {
    let (ra, rb) = (a.promotion_rank()?, b.promotion_rank()?);
    Some(if ra >= rb { a.clone() } else { b.clone() })
}

/// Indexing requires an array and an index that converts to `int` without loss.
pub fn can_index(object: &Type, index: &Type) -> CastRank {
    match object {
        Type::Array(_) => can_cast(index, &Type::Int).strict(),
        _ => CastRank::None,
    }
}

/// Element type produced by indexing.
pub fn type_of_index(object: &Type) -> Option<Type> {
    object.as_array().map(|arr| (*arr.base).clone())
}

/// Storing into an element: index rules plus the value's conversion to the element.
pub fn can_setindex(object: &Type, index: &Type, value: &Type) -> CastRank {
    match object {
        Type::Array(arr) => {
            CastRank::weakest([can_index(object, index), can_cast(value, &arr.base)])
        }
        _ => CastRank::None,
    }
}

/// Arguments must match the parameter count and each convert to its parameter.
pub fn can_call(func: &Type, args: &[Option<&Type>]) -> CastRank {
    let Some(FuncType { params, .. }) = func.as_func() else {
        return CastRank::None;
    };
    if params.len() != args.len() {
        return CastRank::None;
    }
    CastRank::weakest(
        args.iter()
            .zip(params)
            .map(|(arg, param)| can_cast_value(*arg, param)),
    )
}

/// Declared return type of a call, `None` for procedures.
pub fn type_of_call(func: &Type) -> Option<Type> {
    func.as_func().and_then(FuncType::ret).cloned()
}

pub fn can_unop(value: &Type, op: UnaryOp) -> CastRank {
    if !value.is_primitive() {
        return CastRank::None;
    }
    match op {
        UnaryOp::Neg | UnaryOp::Identity => can_cast(value, &Type::Real),
        UnaryOp::Not => can_cast(value, &Type::Bool),
        UnaryOp::BitNot => can_cast(value, &Type::Int),
    }
}

pub fn type_of_unop(value: &Type, op: UnaryOp) -> Type {
    match op {
        UnaryOp::Neg | UnaryOp::Identity => value.clone(),
        UnaryOp::Not => Type::Bool,
        UnaryOp::BitNot => Type::Int,
    }
}

pub fn can_binop(left: &Type, op: BinaryOp, right: &Type) -> CastRank {
    match op.class() {
        OpClass::Arithmetic | OpClass::Comparison => match num_promote(left, right) {
            Some(common) => {
                CastRank::weakest([can_cast(left, &common), can_cast(right, &common)])
            }
            None => CastRank::None,
        },
        OpClass::Logical => {
            CastRank::weakest([can_cast(left, &Type::Bool), can_cast(right, &Type::Bool)])
        }
        OpClass::Bitwise => {
            CastRank::weakest([can_cast(left, &Type::Int), can_cast(right, &Type::Int)])
        }
    }
}

/// Result type of a binary operator; `None` when arithmetic operands have no common type.
pub fn type_of_binop(left: &Type, op: BinaryOp, right: &Type) -> Option<Type> {
    match op.class() {
        OpClass::Arithmetic => num_promote(left, right),
        OpClass::Comparison | OpClass::Logical => Some(Type::Bool),
        OpClass::Bitwise => Some(Type::Int),
    }
}

/// Only arrays with a known size can drive a `for-each` loop.
pub fn can_iterate(ty: &Type) -> CastRank {
    match ty {
        Type::Array(arr) if arr.size.is_some() => CastRank::Implicit,
        _ => CastRank::None,
    }
}
