//! Literal values handed over by the parser.

use crate::types::TypeExpr;

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'ast> {
    Int(i64),
    Real(f64),
    Char(u8),
    Bool(bool),
    /// `[a, b, c]`, optionally with an explicit element type and lower bound.
    Array(ArrayLiteral<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayLiteral<'ast> {
    pub items: &'ast [Literal<'ast>],
    /// Element type; inferred from the first item (or `int`) when absent.
    pub elem: Option<TypeExpr<'ast>>,
    pub lower: i64,
}
