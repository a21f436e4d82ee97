//! Syntax tree consumed by the pasc compiler passes.
//!
//! The tree is produced by an external parser and arrives already
//! grammatically valid. All nodes live in a [`bumpalo::Bump`] arena and are
//! plain `Copy` data borrowing from it; the compiler never mutates them and
//! records its results in side tables keyed by [`ExprId`].
//!
//! ## Modules
//!
//! - [`decl`]: routines, variables and type aliases
//! - [`stmt`]: statements
//! - [`expr`]: expressions
//! - [`literal`]: literal values
//! - [`types`]: type expressions as written in declarations
//! - [`node`]: identifiers and node ids
//! - [`builder`]: [`AstBuilder`], the construction interface

pub mod builder;
pub mod decl;
pub mod expr;
pub mod literal;
pub mod node;
pub mod stmt;
pub mod types;

pub use builder::AstBuilder;
pub use decl::{Decl, Param, ProcDecl, TypeDecl, VarDecl};
pub use expr::{
    AssignExpr, BinaryExpr, CallExpr, Expr, ExprKind, IndexExpr, SetIndexExpr, UnaryExpr,
};
pub use literal::{ArrayLiteral, Literal};
pub use node::{ExprId, Ident};
pub use stmt::{
    Block, BreakStmt, ContinueStmt, ExprStmt, ForEachStmt, ForStmt, IfStmt, RangeStmt, Stmt,
    WhileStmt,
};
pub use types::{ArrayTypeExpr, FieldExpr, FuncTypeExpr, TypeExpr};
