//! Type Resolver Pass - type every expression and check every conversion.
//!
//! Visits each program depth-first: its variable initializers, then its
//! body, then its nested programs in declaration order. Every expression that
//! produces a value gets its type recorded in [`TypeckResults`].
//!
//! ## Conversion policy
//!
//! | rank         | outcome                                          |
//! |--------------|--------------------------------------------------|
//! | `Implicit`   | accepted silently                                |
//! | `Unintended` | warning, or error with `deny_unintended`         |
//! | `Explicit`   | error                                            |
//! | `None`       | error                                            |
//!
//! ## Assigning to the routine's own name
//!
//! Inside a function `f`, `f := value` is a return statement when the value
//! converts implicitly to the return type. Such assignments are recorded as
//! [`ExprRewrite::Return`] and typed with the return type; the syntax tree is
//! left untouched.

use pasc_ast::{Decl, Expr, ExprId, ExprKind, Literal, Stmt};
use pasc_core::types::{
    can_binop, can_call, can_cast, can_index, can_iterate, can_setindex, can_unop, type_of_binop,
    type_of_call, type_of_index, type_of_unop,
};
use pasc_core::{CastRank, CompilationError, CompileWarning, Span, Type, WarningCode};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::CompilerConfig;
use crate::program::{ProgramId, ProgramTree};
use crate::scope::{ScopeId, Symbol};

// ============================================================================
// Results
// ============================================================================

/// How an expression is reinterpreted by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprRewrite {
    /// An assignment to the enclosing function's name: return its value from `program`.
    Return { program: ProgramId },
}

/// Types and rewrites recorded per expression.
#[derive(Debug, Default)]
pub struct TypeckResults {
    types: FxHashMap<ExprId, Type>,
    rewrites: FxHashMap<ExprId, ExprRewrite>,
}

impl TypeckResults {
    /// Type of the value an expression produces; `None` for procedure calls
    /// and expressions never visited.
    pub fn type_of(&self, id: ExprId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn rewrite(&self, id: ExprId) -> Option<ExprRewrite> {
        self.rewrites.get(&id).copied()
    }

    /// Number of typed expressions.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn rewrite_count(&self) -> usize {
        self.rewrites.len()
    }

    fn record(&mut self, id: ExprId, ty: Option<Type>) -> Option<Type> {
        if let Some(ty) = &ty {
            self.types.insert(id, ty.clone());
        }
        ty
    }
}

/// Output of the type resolver pass.
#[derive(Debug, Default)]
pub struct TypeResolverOutput {
    pub results: TypeckResults,
    /// Accepted `Unintended` conversions, in detection order.
    pub warnings: Vec<CompileWarning>,
}

// ============================================================================
// Pass
// ============================================================================

/// Pass 2: type checking.
pub struct TypeResolver<'a, 'ast> {
    tree: &'a ProgramTree<'ast>,
    config: &'a CompilerConfig,
    output: TypeResolverOutput,
    /// Program whose body is being checked.
    program: ProgramId,
    scope: ScopeId,
    loop_depth: u32,
}

impl<'a, 'ast> TypeResolver<'a, 'ast> {
    pub fn new(tree: &'a ProgramTree<'ast>, config: &'a CompilerConfig) -> Self {
        let root = tree.root();
        Self {
            tree,
            config,
            output: TypeResolverOutput::default(),
            program: root,
            scope: tree.program(root).scope(),
            loop_depth: 0,
        }
    }

    /// Check every program of the tree.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) -> Result<TypeResolverOutput, CompilationError> {
        debug!(programs = self.tree.len(), "type resolver started");
        self.check_program(self.tree.root())?;
        debug!(
            expressions = self.output.results.len(),
            rewrites = self.output.results.rewrite_count(),
            warnings = self.output.warnings.len(),
            "type resolver finished"
        );
        Ok(self.output)
    }

    fn check_program(&mut self, id: ProgramId) -> Result<(), CompilationError> {
        let tree = self.tree;
        let program = tree.program(id);
        trace!(program = program.path(), "checking program");
        self.program = id;
        self.scope = program.scope();
        self.loop_depth = 0;

        self.check_storage(program.params(), 2 * self.config.layout.word())?;
        self.check_storage(program.locals(), 0)?;

        for decl in program.decl().decls {
            if let Decl::Var(var) = decl
                && let Some(init) = var.init
            {
                let declared = self.data_type(var.name.name, var.span);
                let value = self.check_value(init)?;
                self.enforce(can_cast(&value, &declared), init.span, || {
                    format!(
                        "initialize var {} of type {declared} with {value}",
                        var.name.name
                    )
                })?;
            }
        }

        self.check_stmt(program.decl().body)?;

        for &child in program.children() {
            self.check_program(child)?;
        }
        Ok(())
    }

    /// Every variable in `names`, and their running total from `base`, must be
    /// addressable by a signed frame offset.
    fn check_storage(&self, names: &[String], base: u64) -> Result<(), CompilationError> {
        let scope = self.tree.scope(self.scope);
        let mut total = base;
        for name in names {
            let Some(data) = scope.get(name).and_then(Symbol::as_data) else {
                continue;
            };
            total = self
                .config
                .layout
                .checked_size_of(&data.ty)
                .and_then(|size| total.checked_add(size))
                .filter(|&total| i64::try_from(total).is_ok())
                .ok_or_else(|| CompilationError::StorageTooLarge {
                    name: name.clone(),
                    span: data.span,
                })?;
        }
        Ok(())
    }

    // ========================================================================
    // Policy
    // ========================================================================

    fn enforce(
        &mut self,
        rank: CastRank,
        span: Span,
        message: impl FnOnce() -> String,
    ) -> Result<(), CompilationError> {
        if rank == CastRank::Implicit {
            return Ok(());
        }
        let message = message();
        if rank >= self.config.min_rank() {
            warn!(code = ?WarningCode::UnintendedCast, rank = ?rank, %span, "{}", message);
            self.output.warnings.push(CompileWarning {
                code: WarningCode::UnintendedCast,
                message,
                span,
            });
            Ok(())
        } else {
            Err(CompilationError::TypeMismatch {
                message,
                rank,
                span,
            })
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_stmt(&mut self, stmt: &Stmt<'ast>) -> Result<(), CompilationError> {
        match stmt {
            Stmt::Expr(stmt) => {
                self.check_expr(stmt.expr)?;
            }
            Stmt::While(stmt) => {
                self.check_condition(stmt.cond, "while")?;
                self.check_loop_body(stmt.body)?;
            }
            Stmt::If(stmt) => {
                self.check_condition(stmt.cond, "if")?;
                self.check_stmt(stmt.then_branch)?;
                if let Some(else_branch) = stmt.else_branch {
                    self.check_stmt(else_branch)?;
                }
            }
            Stmt::For(stmt) => {
                if let Some(init) = stmt.init {
                    self.check_stmt(init)?;
                }
                self.check_condition(stmt.cond, "for")?;
                self.check_loop_body(stmt.body)?;
                if let Some(post) = stmt.post {
                    self.check_stmt(post)?;
                }
            }
            Stmt::ForEach(each) => {
                let iterable = self.check_value(each.iterable)?;
                self.enforce(can_iterate(&iterable), each.iterable.span, || {
                    format!("iterate over {iterable}")
                })?;
                self.check_induction_var(each.var.name, &Type::Int, each.span)?;
                self.check_loop_body(each.body)?;
            }
            Stmt::Range(range) => {
                for (bound, what) in [
                    (range.lower, "lower bound"),
                    (range.upper, "upper bound"),
                    (range.step, "step"),
                ] {
                    let ty = self.check_value(bound)?;
                    self.enforce(can_cast(&ty, &Type::Real), bound.span, || {
                        format!("use {ty} as range {what}")
                    })?;
                }
                self.check_induction_var(range.var.name, &Type::Real, range.span)?;
                self.check_loop_body(range.body)?;
            }
            Stmt::Compound(block) => {
                for stmt in block.stmts {
                    self.check_stmt(stmt)?;
                }
            }
            Stmt::Break(stmt) => self.check_in_loop("break", stmt.span)?,
            Stmt::Continue(stmt) => self.check_in_loop("continue", stmt.span)?,
        }
        Ok(())
    }

    fn check_condition(
        &mut self,
        cond: &Expr<'ast>,
        keyword: &str,
    ) -> Result<(), CompilationError> {
        let ty = self.check_value(cond)?;
        self.enforce(can_cast(&ty, &Type::Bool), cond.span, || {
            format!("use {ty} as {keyword} condition")
        })
    }

    fn check_loop_body(&mut self, body: &Stmt<'ast>) -> Result<(), CompilationError> {
        self.loop_depth += 1;
        let result = self.check_stmt(body);
        self.loop_depth -= 1;
        result
    }

    fn check_in_loop(&self, keyword: &'static str, span: Span) -> Result<(), CompilationError> {
        if self.loop_depth == 0 {
            return Err(CompilationError::NotALoop { keyword, span });
        }
        Ok(())
    }

    fn check_induction_var(
        &mut self,
        name: &str,
        expected: &Type,
        span: Span,
    ) -> Result<(), CompilationError> {
        let declared = self.data_type(name, span);
        self.enforce(can_cast(&declared, expected), span, || {
            format!("use induction var {name} of type {declared} as {expected}")
        })
    }

    /// Type of a data symbol the tree builder is known to have bound.
    fn data_type(&self, name: &str, span: Span) -> Type {
        match self.tree.lookup(self.scope, name) {
            Some((_, symbol)) => symbol.ty().clone(),
            None => panic!("structural bug: '{name}' at {span} was not bound by the tree builder"),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Type an expression that must produce a value.
    fn check_value(&mut self, expr: &Expr<'ast>) -> Result<Type, CompilationError> {
        match self.check_expr(expr)? {
            Some(ty) => Ok(ty),
            None => Err(CompilationError::TypeMismatch {
                message: "procedure call used as a value".to_string(),
                rank: CastRank::None,
                span: expr.span,
            }),
        }
    }

    fn check_expr(&mut self, expr: &Expr<'ast>) -> Result<Option<Type>, CompilationError> {
        let tree = self.tree;
        let ty = match &expr.kind {
            ExprKind::Literal(lit) => Some(self.literal_type(lit, expr.span)?),
            ExprKind::Name(ident) => match tree.lookup(self.scope, ident.name) {
                Some((_, symbol)) => Some(symbol.ty().clone()),
                None => {
                    return Err(CompilationError::UnresolvedName {
                        name: ident.name.to_string(),
                        span: ident.span,
                    });
                }
            },
            ExprKind::Assign(assign) => {
                let value = self.check_expr(assign.value)?;
                let Some((_, symbol)) = tree.lookup(self.scope, assign.target.name) else {
                    return Err(CompilationError::UnresolvedName {
                        name: assign.target.name.to_string(),
                        span: assign.target.span,
                    });
                };

                if let Symbol::Prog(prog) = symbol
                    && prog.program == self.program
                    && let Some(ret) = tree.program(prog.program).ret()
                    && value.as_ref().is_some_and(|v| can_cast(v, ret) == CastRank::Implicit)
                {
                    trace!(function = assign.target.name, %ret, "assignment rewritten to return");
                    self.output
                        .results
                        .rewrites
                        .insert(expr.id, ExprRewrite::Return { program: prog.program });
                    Some(ret.clone())
                } else {
                    let target = symbol.ty();
                    let kind = if symbol.as_prog().is_some() { "routine" } else { "var" };
                    let rank = value.as_ref().map_or(CastRank::None, |v| can_cast(v, target));
                    self.enforce(rank, expr.span, || {
                        format!(
                            "assign {} to {kind} {} of type {target}",
                            describe(value.as_ref()),
                            assign.target.name
                        )
                    })?;
                    Some(target.clone())
                }
            }
            ExprKind::Index(index) => {
                let object = self.check_value(index.object)?;
                let idx = self.check_value(index.index)?;
                self.enforce(can_index(&object, &idx), expr.span, || {
                    format!("index {object} by {idx}")
                })?;
                type_of_index(&object)
            }
            ExprKind::SetIndex(set) => {
                let object = self.check_value(set.object)?;
                let idx = self.check_value(set.index)?;
                let value = self.check_value(set.value)?;
                self.enforce(can_setindex(&object, &idx, &value), expr.span, || {
                    format!("store {value} into {object} at index {idx}")
                })?;
                type_of_index(&object)
            }
            ExprKind::Call(call) => {
                let Some(callee) = call.callee.as_name() else {
                    return Err(CompilationError::IndirectCall {
                        callee: "<expression>".to_string(),
                        span: call.callee.span,
                    });
                };
                let func = match tree.lookup(self.scope, callee.name) {
                    Some((_, Symbol::Prog(prog))) => prog.ty.clone(),
                    Some((_, Symbol::Data(_))) => {
                        return Err(CompilationError::IndirectCall {
                            callee: callee.name.to_string(),
                            span: callee.span,
                        });
                    }
                    None => {
                        return Err(CompilationError::UnresolvedName {
                            name: callee.name.to_string(),
                            span: callee.span,
                        });
                    }
                };
                self.output.results.record(call.callee.id, Some(func.clone()));

                let args = call
                    .args
                    .iter()
                    .map(|arg| self.check_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let arg_refs: Vec<Option<&Type>> = args.iter().map(Option::as_ref).collect();
                self.enforce(can_call(&func, &arg_refs), expr.span, || {
                    let list: Vec<String> = args.iter().map(|a| describe(a.as_ref())).collect();
                    format!("call {} of type {func} with ({})", callee.name, list.join(", "))
                })?;
                type_of_call(&func)
            }
            ExprKind::Unary(unary) => {
                let operand = self.check_value(unary.operand)?;
                self.enforce(can_unop(&operand, unary.op), expr.span, || {
                    format!("apply '{}' to {operand}", unary.op)
                })?;
                Some(type_of_unop(&operand, unary.op))
            }
            ExprKind::Binary(binary) => {
                let left = self.check_value(binary.left)?;
                let right = self.check_value(binary.right)?;
                self.enforce(can_binop(&left, binary.op, &right), expr.span, || {
                    format!("apply '{}' to {left} and {right}", binary.op)
                })?;
                match type_of_binop(&left, binary.op, &right) {
                    Some(ty) => Some(ty),
                    None => unreachable!("structural bug: accepted operands without a common type"),
                }
            }
        };
        Ok(self.output.results.record(expr.id, ty))
    }

    fn literal_type(&mut self, lit: &Literal<'ast>, span: Span) -> Result<Type, CompilationError> {
        Ok(match lit {
            Literal::Int(_) => Type::Int,
            Literal::Real(_) => Type::Real,
            Literal::Char(_) => Type::Char,
            Literal::Bool(_) => Type::Bool,
            Literal::Array(arr) => {
                let elem = match (&arr.elem, arr.items.first()) {
                    (Some(written), _) => self.tree.resolve_type(self.scope, written)?,
                    (None, Some(first)) => self.literal_type(first, span)?,
                    (None, None) => Type::Int,
                };
                for item in arr.items {
                    let item_ty = self.literal_type(item, span)?;
                    self.enforce(can_cast(&item_ty, &elem), span, || {
                        format!("put {item_ty} into array literal of {elem}")
                    })?;
                }
                Type::array(elem, arr.lower, arr.items.len() as u64)
            }
        })
    }
}

fn describe(ty: Option<&Type>) -> String {
    ty.map_or_else(|| "no value".to_string(), Type::to_string)
}
