//! Parser combinator engine
//!
//! This module provides the [`Parser`] struct: a cursor over the token
//! sequence plus the generic primitives every grammar rule is built from.
//!
//! # Failure model
//!
//! Every rule returns a [`PResult`]. A [`Failure::Soft`] means "this rule does
//! not apply here": the primitives restore the cursor and the caller may try
//! something else. A [`Failure::Hard`] is a syntax error that aborts the whole
//! parse; it is produced by [`Committed::cut`] once a rule has seen enough
//! input to be sure it is the right one.
//!
//! - [`Parser::consume`]: match one token kind
//! - [`Parser::choice`]: ordered choice, aggregate soft failure if nothing applies
//! - [`Parser::optional`]: soft failure becomes `None`
//! - [`Parser::many`]: repeat until the first soft failure
//! - [`Parser::memoized`]: replay an earlier result from the same position
//!
//! # Implementation
//!
//! Grammar rules are split across `declarations`, `statements` and
//! `expressions` using `impl Parser` blocks.

use crate::constants::MAX_NESTING_DEPTH;
use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::token::{Token, TokenKind};
use log::trace;
use rustc_hash::FxHashMap;

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A single token did not match what the grammar required.
    #[error(
        "Syntax error at line {}, column {}: expected {expected}, found {found}",
        .location.line,
        .location.column
    )]
    Unexpected {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    /// No alternative of an ordered choice applied.
    #[error("{}", describe_alternatives(.alternatives))]
    NoAlternative { alternatives: Vec<ParseError> },

    /// The input could not be scanned.
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// Location of the failure. For an aggregate this is the location of its
    /// first alternative.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            ParseError::Unexpected { location, .. } => Some(*location),
            ParseError::NoAlternative { alternatives } => {
                alternatives.first().and_then(ParseError::location)
            }
            ParseError::Lex(err) => Some(err.location),
        }
    }
}

fn describe_alternatives(alternatives: &[ParseError]) -> String {
    let mut text = String::from("Syntax error: failed to parse any of:");
    for alternative in alternatives {
        text.push_str("\n\t");
        text.push_str(&alternative.to_string());
    }
    text
}

/// Why a rule did not produce a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// No match; the cursor has been (or will be) restored.
    Soft(ParseError),
    /// Unrecoverable syntax error.
    Hard(ParseError),
}

impl Failure {
    pub fn into_error(self) -> ParseError {
        match self {
            Failure::Soft(err) | Failure::Hard(err) => err,
        }
    }
}

pub type PResult<T> = Result<T, Failure>;

/// A grammar rule usable as a [`Parser::choice`] alternative.
pub type Rule<T> = fn(&mut Parser) -> PResult<T>;

/// Commit-point promotion for rule results.
pub trait Committed {
    /// Turn a soft failure into a hard one.
    fn cut(self) -> Self;
}

impl<T> Committed for PResult<T> {
    fn cut(self) -> Self {
        self.map_err(|failure| Failure::Hard(failure.into_error()))
    }
}

/// Backtracking recursive descent parser for AtomC
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
    max_depth: usize,
    /// Expression results keyed by (start position, depth), with the end position
    expr_memo: FxHashMap<(usize, usize), (PResult<Expr>, usize)>,
}

impl Parser {
    /// Scan `source` and build a parser over the resulting tokens.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an already scanned token sequence. The sequence
    /// must end with [`TokenKind::End`].
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: MAX_NESTING_DEPTH,
            expr_memo: FxHashMap::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current cursor position (index of the next token)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Parse the entire translation unit
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.unit().map_err(Failure::into_error)
    }

    // ===== Combinators =====

    /// Match a token of `kind` and advance past it.
    pub fn consume(&mut self, kind: TokenKind, expected: &str) -> PResult<Token> {
        let token = self.peek();
        if token.kind == kind {
            let token = token.clone();
            self.advance();
            Ok(token)
        } else {
            Err(Failure::Soft(self.unexpected(expected)))
        }
    }

    /// Try each alternative in order from the current position.
    pub fn choice<T>(&mut self, alternatives: &[Rule<T>]) -> PResult<T> {
        let start = self.position;
        let mut failures = Vec::with_capacity(alternatives.len());

        for alternative in alternatives {
            match alternative(self) {
                Ok(value) => return Ok(value),
                Err(Failure::Soft(err)) => {
                    trace!("choice: backtracking from {} to {}", self.position, start);
                    self.position = start;
                    failures.push(err);
                }
                Err(hard) => return Err(hard),
            }
        }

        Err(Failure::Soft(ParseError::NoAlternative {
            alternatives: failures,
        }))
    }

    /// Try `rule`; a soft failure yields `None` with the cursor restored.
    pub fn optional<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<Option<T>> {
        let start = self.position;
        match rule(self) {
            Ok(value) => Ok(Some(value)),
            Err(Failure::Soft(_)) => {
                trace!("optional: backtracking from {} to {}", self.position, start);
                self.position = start;
                Ok(None)
            }
            Err(hard) => Err(hard),
        }
    }

    /// Apply `rule` until it soft-fails. With `required`, zero matches is a
    /// failure.
    pub fn many<T>(
        &mut self,
        mut rule: impl FnMut(&mut Self) -> PResult<T>,
        required: bool,
    ) -> PResult<Vec<T>> {
        let mut items = Vec::new();

        loop {
            let start = self.position;
            match rule(self) {
                Ok(item) => {
                    items.push(item);
                    // A rule that matches without consuming would repeat forever.
                    if self.position == start {
                        break;
                    }
                }
                Err(Failure::Soft(err)) => {
                    trace!("many: backtracking from {} to {}", self.position, start);
                    self.position = start;
                    if required && items.is_empty() {
                        return Err(Failure::Soft(err));
                    }
                    break;
                }
                Err(hard) => return Err(hard),
            }
        }

        Ok(items)
    }

    /// Run `rule` at most once per start position and nesting depth. Later
    /// calls replay the stored result and move the cursor to where the first
    /// call left it.
    pub(crate) fn memoized(&mut self, rule: Rule<Expr>) -> PResult<Expr> {
        let key = (self.position, self.depth);
        if let Some((result, end)) = self.expr_memo.get(&key) {
            trace!("memoized: replaying {} to {}", key.0, end);
            let result = result.clone();
            self.position = *end;
            return result;
        }
        let result = rule(self);
        self.expr_memo.insert(key, (result.clone(), self.position));
        result
    }

    /// Run a recursive rule one nesting level deeper, failing hard past the
    /// configured depth.
    pub(crate) fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.max_depth {
            return Err(Failure::Hard(self.unexpected("less deeply nested code (nesting too deep)")));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> &Token {
        // The sequence always ends with END and the cursor never passes it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::End)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: self.peek().describe(),
            location: self.current_location(),
        }
    }

    /// Match an identifier and return its text.
    pub(crate) fn identifier(&mut self, expected: &str) -> PResult<(String, SourceLocation)> {
        let token = self.consume(TokenKind::Id, expected)?;
        let name = token.ident().unwrap_or_default().to_string();
        Ok((name, token.location))
    }
}
