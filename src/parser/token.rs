//! Token model shared by the lexer and the parser
//!
//! A [`Token`] is an immutable record of its [`TokenKind`], the decoded
//! [`Literal`] (if the kind carries one) and the position of its first
//! character.

use super::ast::SourceLocation;
use super::lexer::escape_text;
use std::fmt;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifiers
    Id,

    // Keywords
    Break,
    Char,
    Double,
    Else,
    For,
    If,
    Int,
    Return,
    Struct,
    Void,
    While,

    // Literals
    CtInt,
    CtReal,
    CtChar,
    CtString,

    // Delimiters
    Comma,     // ,
    Semicolon, // ;
    LPar,      // (
    RPar,      // )
    LBracket,  // [
    RBracket,  // ]
    LAcc,      // {
    RAcc,      // }

    // Operators
    Add,       // +
    Sub,       // -
    Mul,       // *
    Div,       // /
    Dot,       // .
    And,       // &&
    Or,        // ||
    Not,       // !
    Assign,    // =
    Equal,     // ==
    NotEq,     // !=
    Less,      // <
    LessEq,    // <=
    Greater,   // >
    GreaterEq, // >=

    // End of input
    End,
}

impl TokenKind {
    /// Maps identifier text onto a keyword kind, or [`TokenKind::Id`].
    pub fn keyword_or_id(text: &str) -> TokenKind {
        match text {
            "break" => TokenKind::Break,
            "char" => TokenKind::Char,
            "double" => TokenKind::Double,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "if" => TokenKind::If,
            "int" => TokenKind::Int,
            "return" => TokenKind::Return,
            "struct" => TokenKind::Struct,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            _ => TokenKind::Id,
        }
    }

    /// The fixed spelling of keywords and punctuation; `None` for kinds whose
    /// text depends on the literal.
    pub fn spelling(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Break => "break",
            TokenKind::Char => "char",
            TokenKind::Double => "double",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::If => "if",
            TokenKind::Int => "int",
            TokenKind::Return => "return",
            TokenKind::Struct => "struct",
            TokenKind::Void => "void",
            TokenKind::While => "while",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LPar => "(",
            TokenKind::RPar => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LAcc => "{",
            TokenKind::RAcc => "}",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Dot => ".",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Not => "!",
            TokenKind::Assign => "=",
            TokenKind::Equal => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::Id
            | TokenKind::CtInt
            | TokenKind::CtReal
            | TokenKind::CtChar
            | TokenKind::CtString
            | TokenKind::End => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Id => "ID",
            TokenKind::Break => "BREAK",
            TokenKind::Char => "CHAR",
            TokenKind::Double => "DOUBLE",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::If => "IF",
            TokenKind::Int => "INT",
            TokenKind::Return => "RETURN",
            TokenKind::Struct => "STRUCT",
            TokenKind::Void => "VOID",
            TokenKind::While => "WHILE",
            TokenKind::CtInt => "CT_INT",
            TokenKind::CtReal => "CT_REAL",
            TokenKind::CtChar => "CT_CHAR",
            TokenKind::CtString => "CT_STRING",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::LPar => "LPAR",
            TokenKind::RPar => "RPAR",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LAcc => "LACC",
            TokenKind::RAcc => "RACC",
            TokenKind::Add => "ADD",
            TokenKind::Sub => "SUB",
            TokenKind::Mul => "MUL",
            TokenKind::Div => "DIV",
            TokenKind::Dot => "DOT",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Equal => "EQUAL",
            TokenKind::NotEq => "NOTEQ",
            TokenKind::Less => "LESS",
            TokenKind::LessEq => "LESSEQ",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEq => "GREATEREQ",
            TokenKind::End => "END",
        };
        f.write_str(name)
    }
}

/// The decoded payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Ident(String),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => Ok(()),
            Literal::Ident(name) => write!(f, "{}", name),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Char(c) => write!(f, "{}", c),
            Literal::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A single scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Literal,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, literal: Literal, location: SourceLocation) -> Self {
        Token {
            kind,
            literal,
            location,
        }
    }

    /// Identifier text, if this is an identifier token.
    pub fn ident(&self) -> Option<&str> {
        match &self.literal {
            Literal::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// A canonical spelling of this token that scans back to the same kind
    /// and literal.
    pub fn source_text(&self) -> String {
        if let Some(text) = self.kind.spelling() {
            return text.to_string();
        }
        match &self.literal {
            Literal::None => String::new(),
            Literal::Ident(name) => name.clone(),
            Literal::Int(n) => n.to_string(),
            Literal::Float(x) => format!("{:?}", x),
            Literal::Char(c) => format!("'{}'", escape_text(&c.to_string())),
            Literal::Str(s) => format!("\"{}\"", escape_text(s)),
        }
    }

    /// Short human-readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match (&self.kind, &self.literal) {
            (TokenKind::End, _) => "end of input".to_string(),
            (_, Literal::None) => format!("'{}'", self.kind.spelling().unwrap_or_default()),
            (TokenKind::CtChar, literal) => format!("{} '{}'", self.kind, literal),
            (TokenKind::CtString, literal) => format!("{} \"{}\"", self.kind, literal),
            (_, literal) => format!("{} '{}'", self.kind, literal),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (line: {}, column: {})",
            self.kind, self.literal, self.location.line, self.location.column
        )
    }
}
