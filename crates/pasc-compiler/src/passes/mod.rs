//! Compiler passes.
//!
//! - [`tree_builder`]: Pass 1 - build the program tree and bind every name
//! - [`type_resolver`]: Pass 2 - type check initializers and bodies
//! - [`location_resolver`]: Pass 3 - assign display slots and storage locations
//!
//! Pass 4 (instruction generation) lives in [`crate::codegen`].

pub mod location_resolver;
pub mod tree_builder;
pub mod type_resolver;

pub use location_resolver::{LocationOutput, LocationResolver};
pub use tree_builder::TreeBuilder;
pub use type_resolver::{ExprRewrite, TypeResolver, TypeResolverOutput, TypeckResults};
