//! Semantic type model.
//!
//! [`Type`] is the fully resolved form of a type: the syntax tree carries
//! named references (`TypeExpr::Named` in `pasc-ast`) which the tree builder
//! replaces with the aliased type, so a `Type` can never hold an unresolved
//! reference.
//!
//! The four primitive types carry no payload. They are shared by value and
//! compared structurally like every other type, see [`primitives`].
//!
//! ## Modules
//!
//! - [`cast`]: conversion ranks and the `can_*` / `type_of_*` combinators
//! - [`layout`]: storage sizes for a target word size

pub mod cast;
pub mod layout;

use std::fmt;

pub use cast::{
    CastRank, can_binop, can_call, can_cast, can_cast_value, can_index, can_iterate,
    can_setindex, can_unop, num_promote, type_of_binop, type_of_call, type_of_index,
    type_of_unop,
};
pub use layout::TargetLayout;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Signed machine integer.
    Int,
    /// Floating point number.
    Real,
    /// Single byte character.
    Char,
    /// Truth value.
    Bool,
    /// Array with an explicit lower bound.
    Array(ArrayType),
    /// Procedure or function signature.
    Func(FuncType),
    /// Record whose fields are laid out one after another.
    Struct(Vec<Field>),
    /// Record whose fields share storage.
    Union(Vec<Field>),
}

/// Payload of [`Type::Array`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// Element type.
    pub base: Box<Type>,
    /// Index of the first element.
    pub lower_bound: i64,
    /// Number of elements, `None` for an open array.
    pub size: Option<u64>,
}

/// Payload of [`Type::Func`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType {
    /// Return type, `None` for procedures.
    pub ret: Option<Box<Type>>,
    /// Parameter types in declaration order.
    pub params: Vec<Type>,
}

/// A named member of a struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// The primitive singletons.
pub mod primitives {
    use super::Type;

    pub const INT: Type = Type::Int;
    pub const REAL: Type = Type::Real;
    pub const CHAR: Type = Type::Char;
    pub const BOOL: Type = Type::Bool;
}

impl Type {
    /// A bounded array of `size` elements starting at index `lower_bound`.
    pub fn array(base: Type, lower_bound: i64, size: u64) -> Self {
        Type::Array(ArrayType {
            base: Box::new(base),
            lower_bound,
            size: Some(size),
        })
    }

    /// An open array (size unknown until run time).
    pub fn open_array(base: Type) -> Self {
        Type::Array(ArrayType {
            base: Box::new(base),
            lower_bound: 0,
            size: None,
        })
    }

    /// A function or procedure signature.
    pub fn func(ret: Option<Type>, params: Vec<Type>) -> Self {
        Type::Func(FuncType {
            ret: ret.map(Box::new),
            params,
        })
    }

    /// Whether this is one of `int`, `real`, `char`, `bool`.
    pub fn is_primitive(&self) -> bool {
        self.promotion_rank().is_some()
    }

    /// Position in the numeric promotion order `bool < char < int < real`.
    pub fn promotion_rank(&self) -> Option<u8> {
        match self {
            Type::Bool => Some(0),
            Type::Char => Some(1),
            Type::Int => Some(2),
            Type::Real => Some(3),
            _ => None,
        }
    }

    /// The array payload, if this is an array.
    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// The signature payload, if this is a function type.
    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            Type::Func(func) => Some(func),
            _ => None,
        }
    }
}

impl FuncType {
    /// The declared return type.
    pub fn ret(&self) -> Option<&Type> {
        self.ret.as_deref()
    }
}

impl ArrayType {
    /// One past the last valid index, when the size is known and the bound
    /// fits in an `i64`.
    pub fn upper_bound(&self) -> Option<i64> {
        let size = i64::try_from(self.size?).ok()?;
        self.lower_bound.checked_add(size)
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, kind: &str, fields: &[Field]) -> fmt::Result {
    write!(f, "{kind} {{")?;
    for field in fields {
        write!(f, " {}: {};", field.name, field.ty)?;
    }
    f.write_str(" }")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("int"),
            Type::Real => f.write_str("real"),
            Type::Char => f.write_str("char"),
            Type::Bool => f.write_str("bool"),
            Type::Array(arr) => match arr.size {
                Some(size) => write!(
                    f,
                    "array[{}..{}] of {}",
                    arr.lower_bound,
                    i128::from(arr.lower_bound) + i128::from(size) - 1,
                    arr.base
                ),
                None => write!(f, "array of {}", arr.base),
            },
            Type::Func(func) => {
                f.write_str(if func.ret.is_some() { "function(" } else { "procedure(" })?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                f.write_str(")")?;
                if let Some(ret) = &func.ret {
                    write!(f, ": {ret}")?;
                }
                Ok(())
            }
            Type::Struct(fields) => write_fields(f, "struct", fields),
            Type::Union(fields) => write_fields(f, "union", fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_display() {
        assert_eq!(primitives::INT.to_string(), "int");
        assert_eq!(primitives::REAL.to_string(), "real");
        assert_eq!(primitives::CHAR.to_string(), "char");
        assert_eq!(primitives::BOOL.to_string(), "bool");
    }

    #[test]
    fn array_display_uses_inclusive_bounds() {
        assert_eq!(Type::array(Type::Int, 0, 10).to_string(), "array[0..9] of int");
        assert_eq!(Type::array(Type::Char, 1, 3).to_string(), "array[1..3] of char");
        assert_eq!(Type::open_array(Type::Real).to_string(), "array of real");
    }

    #[test]
    fn func_display() {
        let func = Type::func(Some(Type::Bool), vec![Type::Int, Type::Real]);
        assert_eq!(func.to_string(), "function(int, real): bool");
        let proc_ = Type::func(None, vec![Type::array(Type::Int, 0, 2)]);
        assert_eq!(proc_.to_string(), "procedure(array[0..1] of int)");
    }

    #[test]
    fn record_display() {
        let fields = vec![
            Field { name: "a".into(), ty: Type::Int },
            Field { name: "b".into(), ty: Type::Char },
        ];
        assert_eq!(
            Type::Struct(fields.clone()).to_string(),
            "struct { a: int; b: char; }"
        );
        assert_eq!(Type::Union(fields).to_string(), "union { a: int; b: char; }");
    }

    #[test]
    fn repr_is_deterministic() {
        let ty = Type::func(
            Some(Type::array(Type::Real, -2, 5)),
            vec![Type::open_array(Type::Int), Type::Char],
        );
        assert_eq!(ty.to_string(), ty.clone().to_string());
    }

    #[test]
    fn structural_equality_includes_bounds() {
        assert_eq!(Type::array(Type::Int, 0, 4), Type::array(Type::Int, 0, 4));
        assert_ne!(Type::array(Type::Int, 0, 4), Type::array(Type::Int, 0, 5));
        assert_ne!(Type::array(Type::Int, 0, 4), Type::array(Type::Real, 0, 4));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let arr = Type::array(Type::Int, 1, 10);
        assert_eq!(arr.as_array().and_then(ArrayType::upper_bound), Some(11));
        assert_eq!(Type::open_array(Type::Int).as_array().and_then(ArrayType::upper_bound), None);
    }

    #[test]
    fn huge_bounds_do_not_wrap() {
        let past_end = Type::array(Type::Char, i64::MAX, 2);
        assert_eq!(past_end.as_array().and_then(ArrayType::upper_bound), None);
        let too_long = Type::array(Type::Char, 0, u64::MAX);
        assert_eq!(too_long.as_array().and_then(ArrayType::upper_bound), None);

        assert_eq!(
            past_end.to_string(),
            format!("array[{}..{}] of char", i64::MAX, i128::from(i64::MAX) + 1)
        );
    }
}
