//! Diagnostics produced by the compiler passes.
//!
//! ## Error Taxonomy
//!
//! ```text
//! CompilationError (fatal, first error aborts the pipeline)
//! ├── UnresolvedType / UnresolvedName - no binding reachable through the scope chain
//! ├── TypeMismatch                    - cast rank below the acceptable minimum
//! ├── NotALoop                        - break/continue outside any loop
//! ├── ReservedName                    - user binding of a compiler-owned name
//! ├── StorageTooLarge                 - storage not addressable by a frame offset
//! └── IndirectCall                    - call through a value instead of a declared routine
//!
//! CompileWarning (non-fatal, compilation continues)
//! └── UnintendedCast                  - cast allowed but likely surprising
//! ```
//!
//! Violated internal invariants are not represented here: they indicate a
//! defect in an earlier pass and panic instead.

use std::fmt;

use thiserror::Error;

use crate::Span;
use crate::types::CastRank;

/// Fatal errors that abort compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A type name has no binding reachable through the scope chain.
    #[error("at {span}: unresolved type name '{name}'")]
    UnresolvedType {
        /// The type name that wasn't found.
        name: String,
        /// Where the type was referenced.
        span: Span,
    },

    /// A value name has no binding reachable through the scope chain.
    #[error("at {span}: unknown symbol '{name}'")]
    UnresolvedName {
        /// The identifier that wasn't found.
        name: String,
        /// Where the identifier was used.
        span: Span,
    },

    /// A conversion ranked below what the construct accepts.
    #[error("at {span}: {message} ({rank:?} conversion)")]
    TypeMismatch {
        /// The offending construct and the types involved.
        message: String,
        /// The rank the conversion was classified as.
        rank: CastRank,
        /// Where the conversion happens.
        span: Span,
    },

    /// `break` or `continue` with no enclosing loop.
    #[error("at {span}: {keyword} outside of a loop")]
    NotALoop {
        /// `"break"` or `"continue"`.
        keyword: &'static str,
        span: Span,
    },

    /// The callee is a value rather than a declared procedure or function.
    #[error("at {span}: cannot call '{callee}' indirectly, only declared routines can be called")]
    IndirectCall { callee: String, span: Span },

    /// A declaration reuses a name the compiler binds itself.
    #[error("at {span}: '{name}' is reserved")]
    ReservedName { name: String, span: Span },

    /// A variable, or the frame holding it, is too large to address.
    #[error("at {span}: storage of '{name}' exceeds the addressable range")]
    StorageTooLarge { name: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::UnresolvedType { span, .. } => *span,
            CompilationError::UnresolvedName { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::NotALoop { span, .. } => *span,
            CompilationError::IndirectCall { span, .. } => *span,
            CompilationError::ReservedName { span, .. } => *span,
            CompilationError::StorageTooLarge { span, .. } => *span,
        }
    }
}

/// Warning categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// A conversion ranked `Unintended` was accepted.
    UnintendedCast,
}

/// A non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileWarning {
    pub code: WarningCode,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}: warning: {}", self.span, self.message)
    }
}
