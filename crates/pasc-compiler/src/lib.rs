//! Pascal Compiler
//!
//! A 4-pass compiler from a parsed program to a flat instruction stream.
//!
//! ## Architecture
//!
//! ```text
//!   ProcDecl (AST)
//!        │
//!        ▼
//!   Tree Builder ───────► ProgramTree (programs, scopes, symbols)
//!        │
//!        ▼
//!   Type Resolver ──────► TypeckResults + warnings
//!        │
//!        ▼
//!   Location Resolver ──► display slots, frame layout, locations
//!        │
//!        ▼
//!   Instruction Generator ► Vec<Instruction>
//! ```
//!
//! - **Pass 1 (Tree Builder)**: Create one program per routine and bind
//!   parameters, variables, type aliases, routines and induction variables
//! - **Pass 2 (Type Resolver)**: Type every expression and enforce the cast policy
//! - **Pass 3 (Location Resolver)**: Number programs for the display table and
//!   lay out their frames
//! - **Pass 4 (Instruction Generator)**: Lower every program into prologue,
//!   body and epilogue
//!
//! The first error aborts compilation; accepted `Unintended` conversions are
//! collected as warnings.
//!
//! ## Modules
//!
//! - [`codegen`]: Instruction set, labels and lowering
//! - [`config`]: Compiler settings
//! - [`passes`]: The analysis passes
//! - [`program`]: The program tree
//! - [`scope`]: Scopes and symbols

pub mod codegen;
pub mod config;
pub mod passes;
pub mod program;
pub mod scope;

pub use codegen::{Block, GeneratorOutput, Instruction, InstructionGenerator, Label, LabelRegistry};
pub use config::CompilerConfig;
pub use passes::{
    ExprRewrite, LocationOutput, LocationResolver, TreeBuilder, TypeResolver, TypeResolverOutput,
    TypeckResults,
};
pub use program::{Program, ProgramId, ProgramTree};
pub use scope::{DataSymbol, ProgSymbol, Scope, ScopeId, Symbol, TypeSymbol};

// Re-export the error types from core for convenience
pub use pasc_core::{CompilationError, CompileWarning, WarningCode};

use pasc_ast::ProcDecl;
use tracing::{debug, info};

/// A fully resolved compilation unit.
#[derive(Debug)]
pub struct CompiledObject<'ast> {
    /// Programs and scopes with types and locations assigned.
    pub tree: ProgramTree<'ast>,
    /// Number of display table slots.
    pub display_count: u32,
    /// Expression types and rewrites.
    pub typeck: TypeckResults,
    /// Accepted `Unintended` conversions, in detection order.
    pub warnings: Vec<CompileWarning>,
    /// All programs, concatenated in pre-order.
    pub instructions: Vec<Instruction>,
    /// Labels referenced by `instructions`.
    pub labels: LabelRegistry,
    /// Number of temporaries `instructions` uses, numbered from zero.
    pub temporaries: u32,
}

impl<'ast> CompiledObject<'ast> {
    /// The outermost program.
    pub fn root(&self) -> &Program<'ast> {
        self.tree.program(self.tree.root())
    }

    /// The program at a dotted path such as `main.outer.inner`.
    pub fn program(&self, path: &str) -> Option<&Program<'ast>> {
        self.tree.find(path).map(|id| self.tree.program(id))
    }

    /// Check if compilation produced no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// The main compiler entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run all four passes over `root`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile<'ast>(
        &self,
        root: &'ast ProcDecl<'ast>,
    ) -> Result<CompiledObject<'ast>, CompilationError> {
        debug!(program = root.name.name, "compiling");

        let mut tree = TreeBuilder::new().run(root)?;
        let TypeResolverOutput { results, warnings } =
            TypeResolver::new(&tree, &self.config).run()?;
        let LocationOutput { display_count } =
            LocationResolver::new(&mut tree, self.config.layout).run();
        let GeneratorOutput {
            instructions,
            labels,
            temporaries,
        } = InstructionGenerator::new(&tree, &results, self.config.layout).run();

        info!(
            program = root.name.name,
            programs = tree.len(),
            instructions = instructions.len(),
            temporaries,
            warnings = warnings.len(),
            "compiled"
        );
        Ok(CompiledObject {
            tree,
            display_count,
            typeck: results,
            warnings,
            instructions,
            labels,
            temporaries,
        })
    }
}
