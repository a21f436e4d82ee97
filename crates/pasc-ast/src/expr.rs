//! Expression nodes.

use pasc_core::{BinaryOp, Span, UnaryOp};

use crate::literal::Literal;
use crate::node::{ExprId, Ident};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expr<'ast> {
    /// Identity used to key pass results.
    pub id: ExprId,
    pub kind: ExprKind<'ast>,
    pub span: Span,
}

/// The shape of an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprKind<'ast> {
    /// Literal value
    Literal(Literal<'ast>),
    /// Reference to a variable or routine
    Name(Ident<'ast>),
    /// `target := value`
    Assign(&'ast AssignExpr<'ast>),
    /// `object[index]`
    Index(&'ast IndexExpr<'ast>),
    /// `object[index] := value`
    SetIndex(&'ast SetIndexExpr<'ast>),
    /// `callee(args...)`
    Call(&'ast CallExpr<'ast>),
    /// Prefix operator
    Unary(&'ast UnaryExpr<'ast>),
    /// Infix operator
    Binary(&'ast BinaryExpr<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetIndexExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub value: &'ast Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Expr<'ast>],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub op: BinaryOp,
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
}

impl<'ast> Expr<'ast> {
    /// The identifier this expression names directly, if it is a plain name.
    pub fn as_name(&self) -> Option<Ident<'ast>> {
        match self.kind {
            ExprKind::Name(ident) => Some(ident),
            _ => None,
        }
    }
}
