//! Identifiers and node identities.

use pasc_core::Span;

/// An identifier as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// Identity of an expression node.
///
/// Passes attach their results (resolved types, rewrites) to expressions in
/// side tables keyed by this id, so the tree itself stays immutable once
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);
