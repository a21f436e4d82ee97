//! Statement nodes.
//!
//! Provides nodes for:
//! - Expression statements
//! - Loops (while, for, for-each over arrays, numeric ranges)
//! - Conditionals
//! - Jump statements (break, continue)
//! - Compound statements

use pasc_core::Span;

use crate::expr::Expr;
use crate::node::Ident;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression evaluated for its effect
    Expr(ExprStmt<'ast>),
    /// `while cond do body`
    While(&'ast WhileStmt<'ast>),
    /// `if cond then a [else b]`
    If(&'ast IfStmt<'ast>),
    /// `for (init; cond; post) body`
    For(&'ast ForStmt<'ast>),
    /// `for var in array do body`
    ForEach(&'ast ForEachStmt<'ast>),
    /// `for var := lo to hi step s do body`
    Range(&'ast RangeStmt<'ast>),
    /// `begin ... end`
    Compound(Block<'ast>),
    /// Leave the innermost loop
    Break(BreakStmt),
    /// Skip to the next iteration of the innermost loop
    Continue(ContinueStmt),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::While(s) => s.span,
            Self::If(s) => s.span,
            Self::For(s) => s.span,
            Self::ForEach(s) => s.span,
            Self::Range(s) => s.span,
            Self::Compound(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_branch: &'ast Stmt<'ast>,
    pub else_branch: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: Option<&'ast Stmt<'ast>>,
    pub cond: &'ast Expr<'ast>,
    pub post: Option<&'ast Stmt<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// Iterates the index range of a bounded array.
///
/// The induction variable receives each index in turn, it is implicitly
/// declared as `int` in the enclosing routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForEachStmt<'ast> {
    pub var: Ident<'ast>,
    pub iterable: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// Numeric range loop; the induction variable is implicitly declared as `real`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeStmt<'ast> {
    pub var: Ident<'ast>,
    pub lower: &'ast Expr<'ast>,
    pub upper: &'ast Expr<'ast>,
    pub step: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    pub span: Span,
}
