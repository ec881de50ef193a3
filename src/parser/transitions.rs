//! Transition table driving the lexer
//!
//! The scanner is a finite-state machine. Each row of [`TRANSITIONS`] is keyed
//! by the current [`State`] and a [`Guard`]:
//!
//! - [`Guard::Char`] / [`Guard::Class`] rows are *consuming*: the character is
//!   appended to the pending lexeme and the machine moves to `to`. If the row
//!   carries a token kind, the token is complete (the character is part of it).
//! - [`Guard::Otherwise`] rows are *finalizing*: they fire only when no
//!   consuming row matches, close the pending token without consuming the
//!   character, and hand that character back to [`State::Start`].
//!
//! Consuming rows are tried in table order; the first match wins.

use super::token::TokenKind;

/// Scanner states. `Start` is the only state in which no lexeme is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Start,
    Ident,
    // Numbers
    Zero,
    Octal,
    Decimal,
    HexPrefix,
    Hex,
    Fraction,
    FractionDigits,
    Exponent,
    ExponentSign,
    ExponentDigits,
    // Char and string literals
    CharOpen,
    CharEscape,
    CharBody,
    StringBody,
    StringEscape,
    // Multi-character operators
    AssignOrEqual,
    Amp,
    Pipe,
    Bang,
    LessOrLessEq,
    GreaterOrGreaterEq,
    // Division and comments
    Slash,
    LineComment,
    BlockComment,
    BlockCommentStar,
}

/// Named character-class predicates usable as transition guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Letter,
    LetterOrDigit,
    Digit,
    NonZeroDigit,
    HexDigit,
    ExponentMark,
    Sign,
    NotNewline,
    NotStar,
    NotStarOrSlash,
    CharBody,
    StringBody,
    Escape,
}

impl CharClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::Whitespace => matches!(c, ' ' | '\t' | '\r' | '\n'),
            CharClass::Letter => c.is_ascii_alphabetic() || c == '_',
            CharClass::LetterOrDigit => c.is_ascii_alphanumeric() || c == '_',
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::NonZeroDigit => matches!(c, '1'..='9'),
            CharClass::HexDigit => c.is_ascii_hexdigit(),
            CharClass::ExponentMark => matches!(c, 'e' | 'E'),
            CharClass::Sign => matches!(c, '+' | '-'),
            CharClass::NotNewline => c != '\n',
            CharClass::NotStar => c != '*',
            CharClass::NotStarOrSlash => c != '*' && c != '/',
            CharClass::CharBody => !matches!(c, '\'' | '\\' | '\n'),
            CharClass::StringBody => !matches!(c, '"' | '\\' | '\n'),
            // Unknown escapes pass the escaped character through.
            CharClass::Escape => c != '\n',
        }
    }
}

/// What a transition row is keyed on, besides the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Char(char),
    Class(CharClass),
    Otherwise,
}

/// A single row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: State,
    pub guard: Guard,
    pub to: State,
    pub emit: Option<TokenKind>,
}

/// The outcome of feeding one character to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Append the character and move on; `emit` closes the token including it.
    Consume { to: State, emit: Option<TokenKind> },
    /// Close the pending token; the character is re-examined from `Start`.
    Finalize(TokenKind),
}

const fn on(from: State, c: char, to: State, emit: Option<TokenKind>) -> Transition {
    Transition {
        from,
        guard: Guard::Char(c),
        to,
        emit,
    }
}

const fn class(from: State, class: CharClass, to: State, emit: Option<TokenKind>) -> Transition {
    Transition {
        from,
        guard: Guard::Class(class),
        to,
        emit,
    }
}

const fn otherwise(from: State, emit: TokenKind) -> Transition {
    Transition {
        from,
        guard: Guard::Otherwise,
        to: State::Start,
        emit: Some(emit),
    }
}

use CharClass as C;
use State as S;
use TokenKind as K;

pub static TRANSITIONS: &[Transition] = &[
    // Whitespace
    class(S::Start, C::Whitespace, S::Start, None),
    // Identifiers and keywords
    class(S::Start, C::Letter, S::Ident, None),
    class(S::Ident, C::LetterOrDigit, S::Ident, None),
    otherwise(S::Ident, K::Id),
    // Integers: 0, 0[0-7]*, 0x[0-9a-fA-F]+, [1-9][0-9]*
    on(S::Start, '0', S::Zero, None),
    class(S::Start, C::NonZeroDigit, S::Decimal, None),
    on(S::Zero, 'x', S::HexPrefix, None),
    on(S::Zero, 'X', S::HexPrefix, None),
    class(S::Zero, C::Digit, S::Octal, None),
    on(S::Zero, '.', S::Fraction, None),
    class(S::Zero, C::ExponentMark, S::Exponent, None),
    otherwise(S::Zero, K::CtInt),
    class(S::Octal, C::Digit, S::Octal, None),
    on(S::Octal, '.', S::Fraction, None),
    class(S::Octal, C::ExponentMark, S::Exponent, None),
    otherwise(S::Octal, K::CtInt),
    class(S::HexPrefix, C::HexDigit, S::Hex, None),
    class(S::Hex, C::HexDigit, S::Hex, None),
    otherwise(S::Hex, K::CtInt),
    class(S::Decimal, C::Digit, S::Decimal, None),
    on(S::Decimal, '.', S::Fraction, None),
    class(S::Decimal, C::ExponentMark, S::Exponent, None),
    otherwise(S::Decimal, K::CtInt),
    // Reals: digits '.' digits ([eE] [+-]? digits)? | digits [eE] [+-]? digits
    class(S::Fraction, C::Digit, S::FractionDigits, None),
    class(S::FractionDigits, C::Digit, S::FractionDigits, None),
    class(S::FractionDigits, C::ExponentMark, S::Exponent, None),
    otherwise(S::FractionDigits, K::CtReal),
    class(S::Exponent, C::Sign, S::ExponentSign, None),
    class(S::Exponent, C::Digit, S::ExponentDigits, None),
    class(S::ExponentSign, C::Digit, S::ExponentDigits, None),
    class(S::ExponentDigits, C::Digit, S::ExponentDigits, None),
    otherwise(S::ExponentDigits, K::CtReal),
    // Character literals
    on(S::Start, '\'', S::CharOpen, None),
    on(S::CharOpen, '\\', S::CharEscape, None),
    class(S::CharOpen, C::CharBody, S::CharBody, None),
    class(S::CharEscape, C::Escape, S::CharBody, None),
    on(S::CharBody, '\'', S::Start, Some(K::CtChar)),
    // String literals
    on(S::Start, '"', S::StringBody, None),
    on(S::StringBody, '"', S::Start, Some(K::CtString)),
    on(S::StringBody, '\\', S::StringEscape, None),
    class(S::StringBody, C::StringBody, S::StringBody, None),
    class(S::StringEscape, C::Escape, S::StringBody, None),
    // Delimiters and single-character operators
    on(S::Start, ',', S::Start, Some(K::Comma)),
    on(S::Start, ';', S::Start, Some(K::Semicolon)),
    on(S::Start, '(', S::Start, Some(K::LPar)),
    on(S::Start, ')', S::Start, Some(K::RPar)),
    on(S::Start, '[', S::Start, Some(K::LBracket)),
    on(S::Start, ']', S::Start, Some(K::RBracket)),
    on(S::Start, '{', S::Start, Some(K::LAcc)),
    on(S::Start, '}', S::Start, Some(K::RAcc)),
    on(S::Start, '+', S::Start, Some(K::Add)),
    on(S::Start, '-', S::Start, Some(K::Sub)),
    on(S::Start, '*', S::Start, Some(K::Mul)),
    on(S::Start, '.', S::Start, Some(K::Dot)),
    // = and ==
    on(S::Start, '=', S::AssignOrEqual, None),
    on(S::AssignOrEqual, '=', S::Start, Some(K::Equal)),
    otherwise(S::AssignOrEqual, K::Assign),
    // && and ||
    on(S::Start, '&', S::Amp, None),
    on(S::Amp, '&', S::Start, Some(K::And)),
    on(S::Start, '|', S::Pipe, None),
    on(S::Pipe, '|', S::Start, Some(K::Or)),
    // ! and !=
    on(S::Start, '!', S::Bang, None),
    on(S::Bang, '=', S::Start, Some(K::NotEq)),
    otherwise(S::Bang, K::Not),
    // < <= > >=
    on(S::Start, '<', S::LessOrLessEq, None),
    on(S::LessOrLessEq, '=', S::Start, Some(K::LessEq)),
    otherwise(S::LessOrLessEq, K::Less),
    on(S::Start, '>', S::GreaterOrGreaterEq, None),
    on(S::GreaterOrGreaterEq, '=', S::Start, Some(K::GreaterEq)),
    otherwise(S::GreaterOrGreaterEq, K::Greater),
    // Division and comments
    on(S::Start, '/', S::Slash, None),
    on(S::Slash, '/', S::LineComment, None),
    on(S::Slash, '*', S::BlockComment, None),
    otherwise(S::Slash, K::Div),
    on(S::LineComment, '\n', S::Start, None),
    class(S::LineComment, C::NotNewline, S::LineComment, None),
    on(S::BlockComment, '*', S::BlockCommentStar, None),
    class(S::BlockComment, C::NotStar, S::BlockComment, None),
    on(S::BlockCommentStar, '*', S::BlockCommentStar, None),
    on(S::BlockCommentStar, '/', S::Start, None),
    class(S::BlockCommentStar, C::NotStarOrSlash, S::BlockComment, None),
];

/// Looks up the transition for `(state, c)`.
///
/// Returns `None` when neither a consuming nor a finalizing row applies.
pub fn step(state: State, c: char) -> Option<Step> {
    let mut fallback = None;
    for transition in TRANSITIONS.iter().filter(|t| t.from == state) {
        let matched = match transition.guard {
            Guard::Char(expected) => expected == c,
            Guard::Class(class) => class.matches(c),
            Guard::Otherwise => {
                fallback = transition.emit.map(Step::Finalize);
                false
            }
        };
        if matched {
            return Some(Step::Consume {
                to: transition.to,
                emit: transition.emit,
            });
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consuming_wins_over_finalizing() {
        assert_eq!(
            step(State::AssignOrEqual, '='),
            Some(Step::Consume {
                to: State::Start,
                emit: Some(TokenKind::Equal)
            })
        );
        assert_eq!(
            step(State::AssignOrEqual, 'x'),
            Some(Step::Finalize(TokenKind::Assign))
        );
    }

    #[test]
    fn test_missing_transition() {
        assert_eq!(step(State::Start, '@'), None);
        assert_eq!(step(State::Amp, 'x'), None);
        assert_eq!(step(State::HexPrefix, 'g'), None);
    }

    #[test]
    fn test_every_finalizing_row_emits() {
        for transition in TRANSITIONS {
            if transition.guard == Guard::Otherwise {
                assert!(transition.emit.is_some(), "{:?}", transition.from);
            }
        }
    }
}
