//! Semantic analysis for AtomC programs
//!
//! This module checks a parsed [`Program`](crate::parser::ast::Program)
//! against the language rules:
//! - [`symbols`]: Scoped symbol tables
//! - [`types`]: Type rules, cast legality and constant folding
//! - [`context`]: Enclosing function and loop tracking
//! - [`validate`]: The [`Validator`] walk (declarations)
//! - [`builtins`]: Runtime library signatures
//! - [`errors`]: [`SemanticError`]
//!
//! # Implementation
//!
//! Statement and expression rules extend [`Validator`] from the private
//! `statements` and `expressions` modules.

pub mod builtins;
pub mod context;
pub mod errors;
pub mod symbols;
pub mod types;
pub mod validate;

mod expressions;
mod statements;

pub use errors::{ErrorCategory, SemanticError};
pub use validate::{validate, Validator};
