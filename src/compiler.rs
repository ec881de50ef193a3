//! Front-end pipeline
//!
//! [`compile`] runs the three stages in order and stops at the first error:
//!
//! 1. Scan the source into tokens
//! 2. Parse the tokens into a [`Program`]
//! 3. Validate the program with the builtin functions in scope
//!
//! The returned program is fully type-decorated.

use crate::constants::MAX_NESTING_DEPTH;
use crate::parser::ast::Program;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::parse::{ParseError, Parser};
use crate::semantic::builtins;
use crate::semantic::errors::SemanticError;
use crate::semantic::symbols::SymbolTable;
use crate::semantic::validate::Validator;
use log::debug;

/// Any error the front end can report
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Knobs for a single compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Bind the builtin functions in the root scope before validating
    pub install_builtins: bool,
    /// Nesting limit for statements and expressions
    pub max_nesting_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            install_builtins: true,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl CompilerOptions {
    pub fn with_builtins(mut self, install_builtins: bool) -> Self {
        self.install_builtins = install_builtins;
        self
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }
}

/// Compile `source` with the default options.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    compile_with(source, &CompilerOptions::default())
}

pub fn compile_with(source: &str, options: &CompilerOptions) -> Result<Program, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;

    let mut program = Parser::from_tokens(tokens)
        .with_max_depth(options.max_nesting_depth)
        .parse_program()?;
    debug!("parsed {} top-level declarations", program.declarations.len());

    let mut symbols = SymbolTable::new();
    if options.install_builtins {
        builtins::install(&mut symbols)?;
    }

    let mut validator = Validator::new(symbols);
    validator.validate(&mut program)?;
    debug!(
        "validated program using {} scopes",
        validator.symbols().scope_count()
    );

    Ok(program)
}
