//! # Introduction
//!
//! AtomC turns the source text of a small C-like language into a validated,
//! type-decorated abstract syntax tree.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST → Validator → decorated AST
//! ```
//!
//! 1. [`parser`] — a table-driven scanner ([`parser::lexer`]) and a
//!    backtracking parser built from a handful of combinators
//!    ([`parser::parse`]).
//! 2. [`semantic`] — scoped symbol tables, the structural type system and
//!    the per-construct legality rules.
//! 3. [`compiler`] — wires the stages together and injects the builtin
//!    function table.
//!
//! ## Supported language
//!
//! Types: `int`, `double`, `char`, `void`, structs, one-dimensional arrays.
//! Control flow: `if/else`, `while`, `for`, `break`, `return`.
//! Builtins: `put_s`, `get_s`, `put_i`, `get_i`, `put_d`, `get_d`, `put_c`,
//! `get_c`, `seconds`.

pub mod compiler;
pub mod constants;
pub mod parser;
pub mod semantic;

pub use compiler::{compile, compile_with, CompileError, CompilerOptions};
