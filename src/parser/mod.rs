//! AtomC source code parser
//!
//! This module transforms AtomC source text into an Abstract Syntax Tree (AST):
//! - [`token`]: Token model
//! - [`transitions`]: Lexer state machine table
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Combinator engine (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Parser Implementation
//!
//! Backtracking recursive descent built from a few combinators (ordered
//! choice, optional, repetition, commit). Left-recursive productions are
//! parsed iteratively and folded left. No parser generator is involved.

pub mod ast;
pub mod lexer;
pub mod parse;
pub mod token;
pub mod transitions;

mod declarations;
mod expressions;
mod statements;
