//! Symbol tables.
//!
//! A [`Scope`] holds the bindings of one program: value bindings
//! ([`Symbol::Data`] and [`Symbol::Prog`]) in `names`, type aliases in the
//! separate `types` table. Scopes are stored in the
//! [`ProgramTree`](crate::program::ProgramTree) arena and linked through
//! [`ScopeId`] indices; lookups that walk the parent chain live there.
//!
//! Inserting a name that is already bound in the same scope replaces the old
//! binding. Binding a name in a child scope never touches the parent.

use pasc_ast::Expr;
use pasc_core::{Location, Span, Type};
use rustc_hash::FxHashMap;

use crate::program::ProgramId;

/// Index of a scope in the program tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A variable or argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSymbol<'ast> {
    pub ty: Type,
    /// Assigned by the location resolver.
    pub location: Option<Location>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// A nested procedure or function.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgSymbol {
    /// Always a [`Type::Func`].
    pub ty: Type,
    /// Entry label, assigned by the location resolver.
    pub location: Option<Location>,
    pub program: ProgramId,
}

/// A type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbol {
    pub ty: Type,
    pub span: Span,
}

/// A value binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol<'ast> {
    Data(DataSymbol<'ast>),
    Prog(ProgSymbol),
}

impl<'ast> Symbol<'ast> {
    pub fn ty(&self) -> &Type {
        match self {
            Symbol::Data(data) => &data.ty,
            Symbol::Prog(prog) => &prog.ty,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Symbol::Data(data) => data.location.as_ref(),
            Symbol::Prog(prog) => prog.location.as_ref(),
        }
    }

    pub fn set_location(&mut self, location: Location) {
        match self {
            Symbol::Data(data) => data.location = Some(location),
            Symbol::Prog(prog) => prog.location = Some(location),
        }
    }

    pub fn as_data(&self) -> Option<&DataSymbol<'ast>> {
        match self {
            Symbol::Data(data) => Some(data),
            Symbol::Prog(_) => None,
        }
    }

    pub fn as_prog(&self) -> Option<&ProgSymbol> {
        match self {
            Symbol::Prog(prog) => Some(prog),
            Symbol::Data(_) => None,
        }
    }
}

/// The bindings of one program.
#[derive(Debug)]
pub struct Scope<'ast> {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) program: ProgramId,
    names: FxHashMap<String, Symbol<'ast>>,
    types: FxHashMap<String, TypeSymbol>,
}

impl<'ast> Scope<'ast> {
    pub(crate) fn new(parent: Option<ScopeId>, program: ProgramId) -> Self {
        Self {
            parent,
            children: Vec::new(),
            program,
            names: FxHashMap::default(),
            types: FxHashMap::default(),
        }
    }

    /// The enclosing scope, `None` for the root.
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Scopes of the programs declared here, in declaration order.
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// The program owning this scope.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Bind a value name, returning the binding it replaces.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        symbol: Symbol<'ast>,
    ) -> Option<Symbol<'ast>> {
        self.names.insert(name.into(), symbol)
    }

    /// Bind a type alias, returning the binding it replaces.
    pub fn insert_type(
        &mut self,
        name: impl Into<String>,
        symbol: TypeSymbol,
    ) -> Option<TypeSymbol> {
        self.types.insert(name.into(), symbol)
    }

    /// Local value binding, without walking the parent chain.
    pub fn get(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.names.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol<'ast>> {
        self.names.get_mut(name)
    }

    /// Local type binding, without walking the parent chain.
    pub fn get_type(&self, name: &str) -> Option<&TypeSymbol> {
        self.types.get(name)
    }

    /// Iterate over the value bindings, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Symbol<'ast>)> {
        self.names.iter().map(|(name, sym)| (name.as_str(), sym))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(ty: Type) -> Symbol<'static> {
        Symbol::Data(DataSymbol {
            ty,
            location: None,
            init: None,
            span: Span::default(),
        })
    }

    #[test]
    fn last_insert_wins() {
        let mut scope = Scope::new(None, ProgramId(0));
        assert!(scope.insert("x", data(Type::Int)).is_none());
        let old = scope.insert("x", data(Type::Real));

        assert_eq!(old.map(|s| s.ty().clone()), Some(Type::Int));
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.get("x").map(Symbol::ty), Some(&Type::Real));
    }

    #[test]
    fn names_and_types_are_separate() {
        let mut scope = Scope::new(None, ProgramId(0));
        scope.insert("t", data(Type::Int));
        scope.insert_type(
            "t",
            TypeSymbol {
                ty: Type::Char,
                span: Span::default(),
            },
        );

        assert_eq!(scope.get("t").map(Symbol::ty), Some(&Type::Int));
        assert_eq!(scope.get_type("t").map(|t| &t.ty), Some(&Type::Char));
    }

    #[test]
    fn set_location() {
        let mut scope = Scope::new(None, ProgramId(0));
        scope.insert("x", data(Type::Int));
        if let Some(sym) = scope.get_mut("x") {
            sym.set_location(Location::int(16));
        }

        assert_eq!(
            scope.get("x").and_then(Symbol::location),
            Some(&Location::int(16))
        );
        assert!(scope.get("x").and_then(Symbol::as_prog).is_none());
    }
}
