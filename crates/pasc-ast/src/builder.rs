//! Arena-backed construction of syntax trees.
//!
//! [`AstBuilder`] is the interface a parser drives: it allocates every node in
//! a shared [`Bump`] arena, hands out fresh [`ExprId`]s, and stamps nodes with
//! the span most recently set through [`AstBuilder::at`].
//!
//! ```
//! use bumpalo::Bump;
//! use pasc_ast::{AstBuilder, TypeExpr};
//! use pasc_core::BinaryOp;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! let sum = b.binary(BinaryOp::Add, b.name("x"), b.int(1));
//! let body = b.block(&[b.expr_stmt(b.assign("y", sum))]);
//! let main = b.proc_decl(
//!     "main",
//!     &[b.param("x", TypeExpr::Int)],
//!     &[b.var("y", TypeExpr::Int, None)],
//!     None,
//!     body,
//! );
//! assert_eq!(main.decls.len(), 1);
//! ```
//!
//! Reusing a node reference in two places of the tree shares its [`ExprId`],
//! so both occurrences share their pass results.

use std::cell::Cell;

use bumpalo::Bump;
use pasc_core::{BinaryOp, Span, UnaryOp};

use crate::decl::{Decl, Param, ProcDecl, TypeDecl, VarDecl};
use crate::expr::{
    AssignExpr, BinaryExpr, CallExpr, Expr, ExprKind, IndexExpr, SetIndexExpr, UnaryExpr,
};
use crate::literal::{ArrayLiteral, Literal};
use crate::node::{ExprId, Ident};
use crate::stmt::{
    Block, BreakStmt, ContinueStmt, ExprStmt, ForEachStmt, ForStmt, IfStmt, RangeStmt, Stmt,
    WhileStmt,
};
use crate::types::{ArrayTypeExpr, FieldExpr, FuncTypeExpr, TypeExpr};

/// Allocates syntax-tree nodes into an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
            span: Cell::new(Span::default()),
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Set the position stamped on subsequently built nodes.
    pub fn at(&self, line: u32, col: u32) -> &Self {
        self.span.set(Span::point(line, col));
        self
    }

    /// The position currently stamped on new nodes.
    pub fn span(&self) -> Span {
        self.span.get()
    }

    /// Number of expression ids handed out so far.
    pub fn expr_count(&self) -> u32 {
        self.next_id.get()
    }

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn named_type(&self, name: &str) -> TypeExpr<'ast> {
        TypeExpr::Named(self.ident(name))
    }

    /// `array[lower..lower+size-1] of elem`
    pub fn array_type(&self, elem: TypeExpr<'ast>, lower: i64, size: u64) -> TypeExpr<'ast> {
        TypeExpr::Array(self.arena.alloc(ArrayTypeExpr {
            elem,
            lower,
            size: Some(size),
        }))
    }

    pub fn open_array_type(&self, elem: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Array(self.arena.alloc(ArrayTypeExpr {
            elem,
            lower: 0,
            size: None,
        }))
    }

    pub fn func_type(
        &self,
        ret: Option<TypeExpr<'ast>>,
        params: &[TypeExpr<'ast>],
    ) -> TypeExpr<'ast> {
        TypeExpr::Func(self.arena.alloc(FuncTypeExpr {
            ret,
            params: self.arena.alloc_slice_copy(params),
        }))
    }

    pub fn struct_type(&self, fields: &[(&str, TypeExpr<'ast>)]) -> TypeExpr<'ast> {
        TypeExpr::Struct(self.fields(fields))
    }

    pub fn union_type(&self, fields: &[(&str, TypeExpr<'ast>)]) -> TypeExpr<'ast> {
        TypeExpr::Union(self.fields(fields))
    }

    fn fields(&self, fields: &[(&str, TypeExpr<'ast>)]) -> &'ast [FieldExpr<'ast>] {
        self.arena
            .alloc_slice_fill_iter(fields.iter().map(|&(name, ty)| FieldExpr {
                name: self.ident(name),
                ty,
            }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Allocate an expression with a fresh id.
    pub fn expr(&self, kind: ExprKind<'ast>) -> &'ast Expr<'ast> {
        let id = ExprId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.arena.alloc(Expr {
            id,
            kind,
            span: self.span(),
        })
    }

    pub fn literal(&self, lit: Literal<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Literal(lit))
    }

    pub fn int(&self, value: i64) -> &'ast Expr<'ast> {
        self.literal(Literal::Int(value))
    }

    pub fn real(&self, value: f64) -> &'ast Expr<'ast> {
        self.literal(Literal::Real(value))
    }

    pub fn char(&self, value: u8) -> &'ast Expr<'ast> {
        self.literal(Literal::Char(value))
    }

    pub fn bool(&self, value: bool) -> &'ast Expr<'ast> {
        self.literal(Literal::Bool(value))
    }

    /// `[items...]` with an optional explicit element type.
    pub fn array_literal(
        &self,
        items: &[Literal<'ast>],
        elem: Option<TypeExpr<'ast>>,
        lower: i64,
    ) -> &'ast Expr<'ast> {
        self.literal(Literal::Array(ArrayLiteral {
            items: self.arena.alloc_slice_copy(items),
            elem,
            lower,
        }))
    }

    pub fn name(&self, name: &str) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Name(self.ident(name)))
    }

    pub fn assign(&self, target: &str, value: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let target = self.ident(target);
        self.expr(ExprKind::Assign(self.arena.alloc(AssignExpr { target, value })))
    }

    pub fn index(&self, object: &'ast Expr<'ast>, index: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Index(self.arena.alloc(IndexExpr { object, index })))
    }

    pub fn set_index(
        &self,
        object: &'ast Expr<'ast>,
        index: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        self.expr(ExprKind::SetIndex(self.arena.alloc(SetIndexExpr {
            object,
            index,
            value,
        })))
    }

    /// Call a routine by name.
    pub fn call(&self, callee: &str, args: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        let callee = self.name(callee);
        self.call_expr(callee, args)
    }

    pub fn call_expr(
        &self,
        callee: &'ast Expr<'ast>,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        let args = self.arena.alloc_slice_fill_iter(args.iter().map(|arg| **arg));
        self.expr(ExprKind::Call(self.arena.alloc(CallExpr { callee, args })))
    }

    pub fn unary(&self, op: UnaryOp, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Unary(self.arena.alloc(UnaryExpr { op, operand })))
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        left: &'ast Expr<'ast>,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        self.expr(ExprKind::Binary(self.arena.alloc(BinaryExpr { op, left, right })))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn alloc_stmt(&self, stmt: Stmt<'ast>) -> &'ast Stmt<'ast> {
        self.arena.alloc(stmt)
    }

    pub fn expr_stmt(&self, expr: &'ast Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr,
            span: expr.span,
        })
    }

    pub fn while_loop(&self, cond: &'ast Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            cond,
            body: self.alloc_stmt(body),
            span: self.span(),
        }))
    }

    pub fn if_then(
        &self,
        cond: &'ast Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            cond,
            then_branch: self.alloc_stmt(then_branch),
            else_branch: else_branch.map(|stmt| self.alloc_stmt(stmt)),
            span: self.span(),
        }))
    }

    pub fn for_loop(
        &self,
        init: Option<Stmt<'ast>>,
        cond: &'ast Expr<'ast>,
        post: Option<Stmt<'ast>>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::For(self.arena.alloc(ForStmt {
            init: init.map(|stmt| self.alloc_stmt(stmt)),
            cond,
            post: post.map(|stmt| self.alloc_stmt(stmt)),
            body: self.alloc_stmt(body),
            span: self.span(),
        }))
    }

    pub fn for_each(
        &self,
        var: &str,
        iterable: &'ast Expr<'ast>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::ForEach(self.arena.alloc(ForEachStmt {
            var: self.ident(var),
            iterable,
            body: self.alloc_stmt(body),
            span: self.span(),
        }))
    }

    pub fn range(
        &self,
        var: &str,
        lower: &'ast Expr<'ast>,
        upper: &'ast Expr<'ast>,
        step: &'ast Expr<'ast>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::Range(self.arena.alloc(RangeStmt {
            var: self.ident(var),
            lower,
            upper,
            step,
            body: self.alloc_stmt(body),
            span: self.span(),
        }))
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Compound(Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        })
    }

    pub fn break_stmt(&self) -> Stmt<'ast> {
        Stmt::Break(BreakStmt { span: self.span() })
    }

    pub fn continue_stmt(&self) -> Stmt<'ast> {
        Stmt::Continue(ContinueStmt { span: self.span() })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, name: &str, ty: TypeExpr<'ast>) -> Param<'ast> {
        Param {
            name: self.ident(name),
            ty,
            span: self.span(),
        }
    }

    pub fn var(
        &self,
        name: &str,
        ty: TypeExpr<'ast>,
        init: Option<&'ast Expr<'ast>>,
    ) -> Decl<'ast> {
        Decl::Var(VarDecl {
            name: self.ident(name),
            ty,
            init,
            span: self.span(),
        })
    }

    pub fn type_alias(&self, name: &str, ty: TypeExpr<'ast>) -> Decl<'ast> {
        Decl::Type(TypeDecl {
            name: self.ident(name),
            ty,
            span: self.span(),
        })
    }

    /// A procedure (`ret` absent) or function.
    pub fn proc_decl(
        &self,
        name: &str,
        params: &[Param<'ast>],
        decls: &[Decl<'ast>],
        ret: Option<TypeExpr<'ast>>,
        body: Stmt<'ast>,
    ) -> &'ast ProcDecl<'ast> {
        self.arena.alloc(ProcDecl {
            name: self.ident(name),
            params: self.arena.alloc_slice_copy(params),
            decls: self.arena.alloc_slice_copy(decls),
            ret,
            body: self.alloc_stmt(body),
            span: self.span(),
        })
    }
}
