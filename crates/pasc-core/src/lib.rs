//! Core definitions shared by every pasc crate.
//!
//! ## Modules
//!
//! - [`types`]: the resolved type model, conversion ranks and storage layout
//! - [`location`]: symbolic address expressions consumed by code generation
//! - [`ops`]: unary and binary operators
//! - [`error`]: fatal errors and warnings
//! - [`span`]: source positions

pub mod error;
pub mod location;
pub mod ops;
pub mod span;
pub mod types;

pub use error::{CompilationError, CompileWarning, WarningCode};
pub use location::{Constant, DISPLAY_SYMBOL, Location, Register, TempId};
pub use ops::{BinaryOp, OpClass, UnaryOp};
pub use span::Span;
pub use types::{ArrayType, CastRank, Field, FuncType, TargetLayout, Type, primitives};
