//! Semantic error types
//!
//! This module defines [`SemanticError`], which represents every rule
//! violation the validator can detect. Each error belongs to one
//! [`ErrorCategory`]: `Domain` errors concern names and the legal placement of
//! constructs, `Type` errors concern the types of declarations and operands.
//!
//! Validation stops at the first error, so a program yields at most one.

use crate::parser::ast::SourceLocation;
use std::fmt;

/// Coarse classification used as the diagnostic prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Type,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Domain => write!(f, "Domain"),
            ErrorCategory::Type => write!(f, "Type"),
        }
    }
}

/// Errors raised while validating a program
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    /// A name declared twice in the same scope
    DuplicateSymbol {
        name: String,
        location: SourceLocation,
    },

    /// A name that resolves in no enclosing scope
    UndefinedSymbol {
        name: String,
        location: SourceLocation,
    },

    /// A name that resolves, but to the wrong kind of symbol
    WrongSymbolKind {
        name: String,
        expected: &'static str,
        location: SourceLocation,
    },

    /// Member access naming a field the struct does not declare
    UnknownMember {
        struct_name: String,
        member: String,
        location: SourceLocation,
    },

    /// Function argument count mismatch
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    BreakOutsideLoop { location: SourceLocation },

    ReturnOutsideFunction { location: SourceLocation },

    /// Any violation of the typing rules
    Type {
        message: String,
        location: SourceLocation,
    },
}

impl SemanticError {
    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        SemanticError::Type {
            message: message.into(),
            location,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SemanticError::Type { .. } => ErrorCategory::Type,
            _ => ErrorCategory::Domain,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            SemanticError::DuplicateSymbol { location, .. } => *location,
            SemanticError::UndefinedSymbol { location, .. } => *location,
            SemanticError::WrongSymbolKind { location, .. } => *location,
            SemanticError::UnknownMember { location, .. } => *location,
            SemanticError::ArgumentCountMismatch { location, .. } => *location,
            SemanticError::BreakOutsideLoop { location } => *location,
            SemanticError::ReturnOutsideFunction { location } => *location,
            SemanticError::Type { location, .. } => *location,
        }
    }

    /// The diagnostic text without category and position
    pub fn message(&self) -> String {
        match self {
            SemanticError::DuplicateSymbol { name, .. } => format!("Duplicate symbol {}", name),
            SemanticError::UndefinedSymbol { name, .. } => {
                format!("Symbol {} doesn't exist", name)
            }
            SemanticError::WrongSymbolKind { name, expected, .. } => {
                format!("{} is not a {}", name, expected)
            }
            SemanticError::UnknownMember {
                struct_name,
                member,
                ..
            } => format!("struct {} has no member {}", struct_name, member),
            SemanticError::ArgumentCountMismatch {
                function,
                expected,
                got,
                ..
            } => format!(
                "Function {} expects {} argument(s), got {}",
                function, expected, got
            ),
            SemanticError::BreakOutsideLoop { .. } => "break used outside of a loop".to_string(),
            SemanticError::ReturnOutsideFunction { .. } => {
                "return used outside of a function".to_string()
            }
            SemanticError::Type { message, .. } => message.clone(),
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        write!(
            f,
            "{} error at line {}, column {}: {}",
            self.category(),
            location.line,
            location.column,
            self.message()
        )
    }
}

impl std::error::Error for SemanticError {}
