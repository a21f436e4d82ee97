//! Tree Builder Pass - build the program tree and populate every scope.
//!
//! Walks the syntax tree top-down. For each routine it creates a
//! [`Program`](crate::program::Program) and its scope, then binds in
//! declaration order:
//!
//! - arguments (as data symbols)
//! - local variables, type aliases, and nested routines
//! - induction variables of `for-each` and range loops found anywhere in the
//!   body, unless the routine already binds the name itself
//!
//! The last binding of a name wins, and only names still bound to data stay
//! in the routine's local list. `__display` belongs to the compiler and
//! cannot be declared.
//!
//! Written types are resolved against the scope being populated, so a
//! declaration sees the aliases declared before it here and everything
//! visible in enclosing routines. A nested routine's signature is resolved
//! and bound in the enclosing scope before its own scope is built, which
//! lets it call itself.

use pasc_ast::{Decl, ProcDecl, Stmt};
use pasc_core::{CompilationError, DISPLAY_SYMBOL, Span, Type};
use tracing::{debug, trace};

use crate::program::{ProgramId, ProgramTree};
use crate::scope::{DataSymbol, ProgSymbol, ScopeId, Symbol, TypeSymbol};

/// Pass 1: build the program tree.
pub struct TreeBuilder<'ast> {
    tree: ProgramTree<'ast>,
    symbols_bound: usize,
}

impl<'ast> TreeBuilder<'ast> {
    pub fn new() -> Self {
        Self {
            tree: ProgramTree::new(),
            symbols_bound: 0,
        }
    }

    /// Build the tree rooted at the top-level program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(
        mut self,
        root: &'ast ProcDecl<'ast>,
    ) -> Result<ProgramTree<'ast>, CompilationError> {
        debug!(program = root.name.name, "tree builder started");

        // The root has no enclosing scope; its signature sees only its own, still empty, scope.
        let id = self.tree.add_program(root, None, Type::func(None, vec![]));
        let ty = signature(&self.tree, self.tree.program(id).scope(), root)?;
        self.tree.program_mut(id).ty = ty.clone();
        self.build_program(id, ty)?;

        debug!(
            programs = self.tree.len(),
            symbols = self.symbols_bound,
            "tree builder finished"
        );
        Ok(self.tree)
    }

    fn build_program(&mut self, id: ProgramId, ty: Type) -> Result<(), CompilationError> {
        let program = self.tree.program(id);
        let decl = program.decl();
        let scope = program.scope();
        trace!(program = program.path(), "building scope");

        let param_types = match ty {
            Type::Func(func) => func.params,
            _ => unreachable!("structural bug: program signature is not a function type"),
        };
        for (param, ty) in decl.params.iter().zip(param_types) {
            check_name(param.name.name, param.span)?;
            self.bind_data(scope, param.name.name, ty, None, param.span);
            self.tree.program_mut(id).params.push(param.name.name.to_string());
        }

        for local in decl.decls {
            match local {
                Decl::Var(var) => {
                    check_name(var.name.name, var.span)?;
                    let ty = self.tree.resolve_type(scope, &var.ty)?;
                    self.bind_data(scope, var.name.name, ty, var.init, var.span);
                    self.add_local(id, var.name.name);
                }
                Decl::Type(alias) => {
                    let ty = self.tree.resolve_type(scope, &alias.ty)?;
                    self.tree.scope_mut(scope).insert_type(
                        alias.name.name,
                        TypeSymbol {
                            ty,
                            span: alias.span,
                        },
                    );
                    self.symbols_bound += 1;
                }
                Decl::Proc(nested) => {
                    check_name(nested.name.name, nested.span)?;
                    let ty = signature(&self.tree, scope, nested)?;
                    let child = self.tree.add_program(nested, Some(id), ty.clone());
                    self.tree.scope_mut(scope).insert(
                        nested.name.name,
                        Symbol::Prog(ProgSymbol {
                            ty: ty.clone(),
                            location: None,
                            program: child,
                        }),
                    );
                    self.symbols_bound += 1;
                    self.tree
                        .program_mut(id)
                        .locals
                        .retain(|local| local != nested.name.name);
                    self.build_program(child, ty)?;
                }
            }
        }

        self.bind_induction_vars(id, scope, decl.body)
    }

    /// Register the induction variables of every loop in `stmt`.
    fn bind_induction_vars(
        &mut self,
        id: ProgramId,
        scope: ScopeId,
        stmt: &'ast Stmt<'ast>,
    ) -> Result<(), CompilationError> {
        match stmt {
            Stmt::ForEach(each) => {
                self.bind_induction_var(id, scope, each.var.name, Type::Int, each.span)?;
                self.bind_induction_vars(id, scope, each.body)
            }
            Stmt::Range(range) => {
                self.bind_induction_var(id, scope, range.var.name, Type::Real, range.span)?;
                self.bind_induction_vars(id, scope, range.body)
            }
            Stmt::While(stmt) => self.bind_induction_vars(id, scope, stmt.body),
            Stmt::If(stmt) => {
                self.bind_induction_vars(id, scope, stmt.then_branch)?;
                match stmt.else_branch {
                    Some(else_branch) => self.bind_induction_vars(id, scope, else_branch),
                    None => Ok(()),
                }
            }
            Stmt::For(stmt) => {
                for part in [stmt.init, stmt.post].into_iter().flatten() {
                    self.bind_induction_vars(id, scope, part)?;
                }
                self.bind_induction_vars(id, scope, stmt.body)
            }
            Stmt::Compound(block) => {
                for stmt in block.stmts {
                    self.bind_induction_vars(id, scope, stmt)?;
                }
                Ok(())
            }
            Stmt::Expr(_) | Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
        }
    }

    fn bind_induction_var(
        &mut self,
        id: ProgramId,
        scope: ScopeId,
        name: &str,
        ty: Type,
        span: Span,
    ) -> Result<(), CompilationError> {
        check_name(name, span)?;
        // A binding made by the routine itself is reused; its type is checked later.
        if self.tree.scope(scope).get(name).is_some() {
            return Ok(());
        }
        trace!(name, %ty, "induction variable");
        self.bind_data(scope, name, ty, None, span);
        self.add_local(id, name);
        Ok(())
    }

    fn bind_data(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        init: Option<&'ast pasc_ast::Expr<'ast>>,
        span: Span,
    ) {
        self.tree.scope_mut(scope).insert(
            name,
            Symbol::Data(DataSymbol {
                ty,
                location: None,
                init,
                span,
            }),
        );
        self.symbols_bound += 1;
    }

    fn add_local(&mut self, id: ProgramId, name: &str) {
        let locals = &mut self.tree.program_mut(id).locals;
        if !locals.iter().any(|local| local == name) {
            locals.push(name.to_string());
        }
    }
}

impl Default for TreeBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: &str, span: Span) -> Result<(), CompilationError> {
    if name == DISPLAY_SYMBOL {
        return Err(CompilationError::ReservedName {
            name: name.to_string(),
            span,
        });
    }
    Ok(())
}

/// Resolve a routine's full signature in the scope it is declared in.
fn signature(
    tree: &ProgramTree<'_>,
    scope: ScopeId,
    decl: &ProcDecl<'_>,
) -> Result<Type, CompilationError> {
    let ret = decl
        .ret
        .as_ref()
        .map(|ret| tree.resolve_type(scope, ret))
        .transpose()?;
    let params = decl
        .params
        .iter()
        .map(|param| tree.resolve_type(scope, &param.ty))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Type::func(ret, params))
}
