//! Declaration nodes: routines, variables and type aliases.

use pasc_core::Span;

use crate::expr::Expr;
use crate::node::Ident;
use crate::stmt::Stmt;
use crate::types::TypeExpr;

/// A program, procedure or function.
///
/// The root of every syntax tree is a `ProcDecl`; nested routines appear as
/// [`Decl::Proc`] entries in `decls`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcDecl<'ast> {
    pub name: Ident<'ast>,
    /// Formal arguments in declaration order.
    pub params: &'ast [Param<'ast>],
    /// Local declarations in declaration order.
    pub decls: &'ast [Decl<'ast>],
    /// Return type, absent for procedures.
    pub ret: Option<TypeExpr<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// A formal argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

/// A local declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    /// `var name: ty [:= init]`
    Var(VarDecl<'ast>),
    /// `type name = ty`
    Type(TypeDecl<'ast>),
    /// Nested procedure or function
    Proc(&'ast ProcDecl<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}

impl<'ast> Decl<'ast> {
    /// The declared identifier.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Decl::Var(var) => var.name,
            Decl::Type(alias) => alias.name,
            Decl::Proc(proc_) => proc_.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Var(var) => var.span,
            Decl::Type(alias) => alias.span,
            Decl::Proc(proc_) => proc_.span,
        }
    }
}
