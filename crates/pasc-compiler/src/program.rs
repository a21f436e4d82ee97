//! The program tree.
//!
//! Every procedure, function and the top-level program get a [`Program`]
//! paired with its own [`Scope`]. Both live in the [`ProgramTree`] arena and
//! refer to each other, and to their parents, through indices:
//!
//! ```text
//! ProgramTree
//! ├── programs: [main, outer, inner, helper]     (creation = pre-order)
//! └── scopes:   [s0,   s1,    s2,    s3]
//!
//! main (s0, parent: -)
//! ├── outer (s1, parent: main)
//! │   └── inner (s2, parent: outer)
//! └── helper (s3, parent: main)
//! ```

use pasc_ast::{ProcDecl, TypeExpr};
use pasc_core::{CompilationError, Field, Type};

use crate::scope::{Scope, ScopeId, Symbol, TypeSymbol};

/// Index of a program in the program tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub(crate) u32);

impl ProgramId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A procedure, function or the top-level program.
#[derive(Debug)]
pub struct Program<'ast> {
    decl: &'ast ProcDecl<'ast>,
    scope: ScopeId,
    parent: Option<ProgramId>,
    children: Vec<ProgramId>,
    path: String,
    pub(crate) ty: Type,
    pub(crate) params: Vec<String>,
    pub(crate) locals: Vec<String>,
    pub(crate) display_index: Option<u32>,
    pub(crate) frame_size: u64,
    pub(crate) args_size: u64,
}

impl<'ast> Program<'ast> {
    pub fn name(&self) -> &'ast str {
        self.decl.name.name
    }

    pub fn decl(&self) -> &'ast ProcDecl<'ast> {
        self.decl
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The enclosing program, `None` for the root.
    pub fn parent(&self) -> Option<ProgramId> {
        self.parent
    }

    /// Nested programs in declaration order.
    pub fn children(&self) -> &[ProgramId] {
        &self.children
    }

    /// Dot-separated nesting path, e.g. `main.outer.inner`. Used as the entry label.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The program's signature, always a [`Type::Func`].
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Declared return type, `None` for procedures.
    pub fn ret(&self) -> Option<&Type> {
        self.ty.as_func().and_then(|func| func.ret())
    }

    /// Argument names in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Names of the variables stored in this program's frame: declared
    /// variables first, then implicitly declared induction variables.
    pub fn locals(&self) -> &[String] {
        &self.locals
    }

    /// Slot in the display table, assigned by the location resolver.
    pub fn display_index(&self) -> Option<u32> {
        self.display_index
    }

    /// Bytes of local storage below the frame base.
    pub fn frame_size(&self) -> u64 {
        self.frame_size
    }

    /// Bytes of arguments pushed by a caller.
    pub fn args_size(&self) -> u64 {
        self.args_size
    }
}

/// Arena of programs and their scopes.
#[derive(Debug, Default)]
pub struct ProgramTree<'ast> {
    programs: Vec<Program<'ast>>,
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> ProgramTree<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a program and its scope, chained to the parent's scope.
    pub fn add_program(
        &mut self,
        decl: &'ast ProcDecl<'ast>,
        parent: Option<ProgramId>,
        ty: Type,
    ) -> ProgramId {
        let id = ProgramId(self.programs.len() as u32);
        let scope_id = ScopeId(self.scopes.len() as u32);

        let (parent_scope, path) = match parent {
            Some(parent) => {
                let parent_program = self.program(parent);
                (
                    Some(parent_program.scope),
                    format!("{}.{}", parent_program.path, decl.name.name),
                )
            }
            None => (None, decl.name.name.to_string()),
        };

        self.scopes.push(Scope::new(parent_scope, id));
        if let Some(parent_scope) = parent_scope {
            self.scopes[parent_scope.index()].children.push(scope_id);
        }
        if let Some(parent) = parent {
            self.programs[parent.index()].children.push(id);
        }

        self.programs.push(Program {
            decl,
            scope: scope_id,
            parent,
            children: Vec::new(),
            path,
            ty,
            params: Vec::new(),
            locals: Vec::new(),
            display_index: None,
            frame_size: 0,
            args_size: 0,
        });
        id
    }

    /// The top-level program.
    ///
    /// # Panics
    ///
    /// Panics if the tree is empty.
    pub fn root(&self) -> ProgramId {
        assert!(!self.programs.is_empty(), "structural bug: empty program tree");
        ProgramId(0)
    }

    pub fn program(&self, id: ProgramId) -> &Program<'ast> {
        &self.programs[id.index()]
    }

    pub fn program_mut(&mut self, id: ProgramId) -> &mut Program<'ast> {
        &mut self.programs[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope<'ast> {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope<'ast> {
        &mut self.scopes[id.index()]
    }

    /// Scope of a program.
    pub fn scope_of(&self, id: ProgramId) -> &Scope<'ast> {
        self.scope(self.program(id).scope)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// All programs, depth-first pre-order starting at the root.
    pub fn preorder(&self) -> Vec<ProgramId> {
        let mut order = Vec::with_capacity(self.programs.len());
        if self.programs.is_empty() {
            return order;
        }
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.program(id).children.iter().rev());
        }
        order
    }

    /// Find a program by its nesting path.
    pub fn find(&self, path: &str) -> Option<ProgramId> {
        self.programs
            .iter()
            .position(|program| program.path == path)
            .map(|index| ProgramId(index as u32))
    }

    /// Resolve a value name, walking outward from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol<'ast>)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(symbol) = scope.get(name) {
                return Some((id, symbol));
            }
            current = scope.parent;
        }
        None
    }

    /// Resolve a type alias, walking outward from `scope`.
    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Option<&TypeSymbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(symbol) = scope.get_type(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    /// Turn a written type into a resolved [`Type`], replacing every alias
    /// reference visible from `scope` with the aliased type.
    pub fn resolve_type(
        &self,
        scope: ScopeId,
        ty: &TypeExpr<'_>,
    ) -> Result<Type, CompilationError> {
        Ok(match ty {
            TypeExpr::Int => Type::Int,
            TypeExpr::Real => Type::Real,
            TypeExpr::Char => Type::Char,
            TypeExpr::Bool => Type::Bool,
            TypeExpr::Named(ident) => self
                .lookup_type(scope, ident.name)
                .map(|alias| alias.ty.clone())
                .ok_or_else(|| CompilationError::UnresolvedType {
                    name: ident.name.to_string(),
                    span: ident.span,
                })?,
            TypeExpr::Array(arr) => {
                let base = self.resolve_type(scope, &arr.elem)?;
                match arr.size {
                    Some(size) => Type::array(base, arr.lower, size),
                    None => Type::open_array(base),
                }
            }
            TypeExpr::Func(func) => {
                let ret = func
                    .ret
                    .as_ref()
                    .map(|ret| self.resolve_type(scope, ret))
                    .transpose()?;
                let params = func
                    .params
                    .iter()
                    .map(|param| self.resolve_type(scope, param))
                    .collect::<Result<Vec<_>, _>>()?;
                Type::func(ret, params)
            }
            TypeExpr::Struct(fields) => Type::Struct(self.resolve_fields(scope, fields)?),
            TypeExpr::Union(fields) => Type::Union(self.resolve_fields(scope, fields)?),
        })
    }

    fn resolve_fields(
        &self,
        scope: ScopeId,
        fields: &[pasc_ast::FieldExpr<'_>],
    ) -> Result<Vec<Field>, CompilationError> {
        fields
            .iter()
            .map(|field| {
                Ok(Field {
                    name: field.name.name.to_string(),
                    ty: self.resolve_type(scope, &field.ty)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::DataSymbol;
    use bumpalo::Bump;
    use pasc_ast::AstBuilder;
    use pasc_core::Span;

    fn data(ty: Type) -> Symbol<'static> {
        Symbol::Data(DataSymbol {
            ty,
            location: None,
            init: None,
            span: Span::default(),
        })
    }

    #[test]
    fn paths_and_preorder() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[]);
        let main = b.proc_decl("main", &[], &[], None, body);
        let outer = b.proc_decl("outer", &[], &[], None, body);
        let inner = b.proc_decl("inner", &[], &[], None, body);
        let helper = b.proc_decl("helper", &[], &[], None, body);

        let mut tree = ProgramTree::new();
        let proc_ty = Type::func(None, vec![]);
        let m = tree.add_program(main, None, proc_ty.clone());
        let o = tree.add_program(outer, Some(m), proc_ty.clone());
        let h = tree.add_program(helper, Some(m), proc_ty.clone());
        let i = tree.add_program(inner, Some(o), proc_ty);

        assert_eq!(tree.program(i).path(), "main.outer.inner");
        assert_eq!(tree.preorder(), vec![m, o, i, h]);
        assert_eq!(tree.find("main.helper"), Some(h));
        assert_eq!(tree.scope_of(i).parent(), Some(tree.program(o).scope()));
        assert_eq!(tree.scope_of(m).children().len(), 2);
    }

    #[test]
    fn child_binding_shadows_without_touching_parent() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[]);
        let main = b.proc_decl("main", &[], &[], None, body);
        let sub = b.proc_decl("sub", &[], &[], None, body);

        let mut tree = ProgramTree::new();
        let m = tree.add_program(main, None, Type::func(None, vec![]));
        let s = tree.add_program(sub, Some(m), Type::func(None, vec![]));
        let (ms, ss) = (tree.program(m).scope(), tree.program(s).scope());

        tree.scope_mut(ms).insert("x", data(Type::Int));
        assert_eq!(tree.lookup(ss, "x").map(|(id, _)| id), Some(ms));

        tree.scope_mut(ss).insert("x", data(Type::Real));
        assert_eq!(tree.lookup(ss, "x").map(|(_, sym)| sym.ty()), Some(&Type::Real));
        assert_eq!(tree.lookup(ms, "x").map(|(_, sym)| sym.ty()), Some(&Type::Int));
    }

    #[test]
    fn resolve_nested_aliases() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.proc_decl("main", &[], &[], None, b.block(&[]));

        let mut tree = ProgramTree::new();
        let m = tree.add_program(main, None, Type::func(None, vec![]));
        let scope = tree.program(m).scope();
        tree.scope_mut(scope).insert_type(
            "vec",
            TypeSymbol {
                ty: Type::array(Type::Real, 1, 3),
                span: Span::default(),
            },
        );

        let written = b.struct_type(&[
            ("pos", b.named_type("vec")),
            ("cb", b.func_type(Some(TypeExpr::Bool), &[b.named_type("vec")])),
        ]);
        let resolved = tree.resolve_type(scope, &written).unwrap();
        assert_eq!(
            resolved.to_string(),
            "struct { pos: array[1..3] of real; cb: function(array[1..3] of real): bool; }"
        );
    }

    #[test]
    fn unresolved_type_reports_name_and_span() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.proc_decl("main", &[], &[], None, b.block(&[]));

        let mut tree = ProgramTree::new();
        let m = tree.add_program(main, None, Type::func(None, vec![]));
        let written = b.open_array_type(b.at(2, 9).named_type("matrix"));

        let err = tree.resolve_type(tree.program(m).scope(), &written).unwrap_err();
        assert_eq!(
            err,
            CompilationError::UnresolvedType {
                name: "matrix".to_string(),
                span: Span::point(2, 9),
            }
        );
    }
}
