//! pasc: the middle and back end of a small Pascal-like compiler.
//!
//! The crate consumes a syntax tree built by an external parser (through
//! [`AstBuilder`]) and produces a [`CompiledObject`]: the resolved program
//! tree plus one flat instruction stream for the whole unit.
//!
//! ```
//! use pasc::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.proc_decl(
//!     "main",
//!     &[b.param("x", TypeExpr::Int)],
//!     &[b.var("y", TypeExpr::Int, None)],
//!     None,
//!     b.expr_stmt(b.assign("y", b.binary(BinaryOp::Add, b.name("x"), b.int(1)))),
//! );
//!
//! let object = pasc::compile(main, CompilerConfig::default()).unwrap();
//! assert_eq!(object.display_count, 1);
//! assert!(object.is_clean());
//! ```
//!
//! ## Crates
//!
//! - [`core`]: types, conversion ranks, locations, errors
//! - [`ast`]: the input syntax tree
//! - [`compiler`]: the passes and the instruction set

pub use pasc_ast as ast;
pub use pasc_compiler as compiler;
pub use pasc_core as core;

pub use bumpalo::Bump;
pub use pasc_ast::AstBuilder;
pub use pasc_compiler::{
    CompiledObject, Compiler, CompilerConfig, Instruction, Label, Program, ProgramTree,
};
pub use pasc_core::{CastRank, CompilationError, CompileWarning, Location, Type, WarningCode};

/// Everything needed to build a tree and compile it.
pub mod prelude {
    pub use bumpalo::Bump;
    pub use pasc_ast::{AstBuilder, Decl, Expr, Literal, ProcDecl, Stmt, TypeExpr};
    pub use pasc_compiler::{
        CompiledObject, Compiler, CompilerConfig, Instruction, Label, Program, ProgramId,
        ProgramTree, Symbol,
    };
    pub use pasc_core::{
        BinaryOp, CastRank, CompilationError, CompileWarning, Constant, Location, Span,
        TargetLayout, Type, UnaryOp, WarningCode,
    };
}

/// Compile `root` with `config`.
pub fn compile<'ast>(
    root: &'ast pasc_ast::ProcDecl<'ast>,
    config: CompilerConfig,
) -> Result<CompiledObject<'ast>, CompilationError> {
    Compiler::new(config).compile(root)
}
