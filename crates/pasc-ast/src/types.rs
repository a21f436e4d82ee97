//! Type expressions as written in declarations.

use crate::node::Ident;

/// A syntactic type.
///
/// `Named` is a reference to a type alias; it is resolved against the scope
/// chain by the tree builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    Int,
    Real,
    Char,
    Bool,
    /// Reference to a type alias.
    Named(Ident<'ast>),
    /// `array[lower..] of elem`, `size` absent for open arrays.
    Array(&'ast ArrayTypeExpr<'ast>),
    /// Procedure or function signature.
    Func(&'ast FuncTypeExpr<'ast>),
    Struct(&'ast [FieldExpr<'ast>]),
    Union(&'ast [FieldExpr<'ast>]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayTypeExpr<'ast> {
    pub elem: TypeExpr<'ast>,
    pub lower: i64,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncTypeExpr<'ast> {
    pub ret: Option<TypeExpr<'ast>>,
    pub params: &'ast [TypeExpr<'ast>],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldExpr<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}
