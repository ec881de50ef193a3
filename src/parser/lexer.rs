//! Lexer (tokenizer) for AtomC source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Scanning is driven entirely by the table in [`super::transitions`]: the
//! lexer only keeps the current state, the pending lexeme and its start
//! position, and turns finished lexemes into literal values.
//!
//! A newline is fed after the last character of the input so that tokens
//! which end at end-of-input (identifiers, numbers, `//` comments) are
//! finalized like any other. Anything still pending afterwards (an open
//! string or block comment) is an error.

use super::ast::SourceLocation;
use super::token::{Literal, Token, TokenKind};
use super::transitions::{step, State, Step};
use log::debug;

/// Lexer error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexical error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Table-driven lexer for AtomC source code
pub struct Lexer {
    input: Vec<char>,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut state = State::Start;
        let mut lexeme = String::new();
        let mut start = self.current_location();

        let input = std::mem::take(&mut self.input);
        let mut end_location = self.current_location();

        for (index, ch) in input.iter().copied().chain(std::iter::once('\n')).enumerate() {
            let at_sentinel = index == input.len();
            if at_sentinel {
                end_location = self.current_location();
            }

            loop {
                if state == State::Start {
                    lexeme.clear();
                    start = self.current_location();
                }

                match step(state, ch) {
                    Some(Step::Consume { to, emit }) => {
                        lexeme.push(ch);
                        match emit {
                            Some(kind) => {
                                tokens.push(make_token(kind, &lexeme, start)?);
                                state = State::Start;
                            }
                            None => state = to,
                        }
                        break;
                    }
                    Some(Step::Finalize(kind)) => {
                        tokens.push(make_token(kind, &lexeme, start)?);
                        state = State::Start;
                    }
                    None => {
                        let message = if at_sentinel {
                            unterminated_message(state).to_string()
                        } else {
                            format!("Unexpected character '{}'", ch.escape_debug())
                        };
                        return Err(LexError {
                            message,
                            location: self.current_location(),
                        });
                    }
                }
            }

            self.advance(ch);
        }

        if state != State::Start {
            return Err(LexError {
                message: unterminated_message(state).to_string(),
                location: end_location,
            });
        }

        tokens.push(Token::new(TokenKind::End, Literal::None, end_location));
        debug!("scanned {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Update line/column after `ch` has been fully processed
    fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn unterminated_message(state: State) -> &'static str {
    match state {
        State::BlockComment | State::BlockCommentStar => "Unterminated block comment",
        State::StringBody | State::StringEscape => "Unterminated string literal",
        State::CharOpen | State::CharEscape | State::CharBody => "Unterminated character literal",
        _ => "Unexpected end of input",
    }
}

/// Turns a finished lexeme into a token, decoding its literal value.
fn make_token(kind: TokenKind, lexeme: &str, location: SourceLocation) -> Result<Token, LexError> {
    let literal = match kind {
        TokenKind::Id => {
            let kind = TokenKind::keyword_or_id(lexeme);
            if kind != TokenKind::Id {
                return Ok(Token::new(kind, Literal::None, location));
            }
            Literal::Ident(lexeme.to_string())
        }
        TokenKind::CtInt => Literal::Int(parse_int(lexeme).ok_or_else(|| LexError {
            message: format!("Invalid integer literal: {}", lexeme),
            location,
        })?),
        TokenKind::CtReal => {
            let value = lexeme.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid real literal: {}", lexeme),
                location,
            })?;
            // An overflowing real has no spelling that scans back.
            if !value.is_finite() {
                return Err(LexError {
                    message: format!("Real literal out of range: {}", lexeme),
                    location,
                });
            }
            Literal::Float(value)
        }
        TokenKind::CtChar => {
            let decoded = decode_escapes(strip_quotes(lexeme));
            let ch = decoded.chars().next().ok_or_else(|| LexError {
                message: "Empty character literal".to_string(),
                location,
            })?;
            Literal::Char(ch)
        }
        TokenKind::CtString => Literal::Str(decode_escapes(strip_quotes(lexeme))),
        _ => Literal::None,
    };
    Ok(Token::new(kind, literal, location))
}

/// `0x..` is hexadecimal, any other leading `0` is octal, the rest decimal.
fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse::<i64>().ok()
    }
}

fn strip_quotes(lexeme: &str) -> &str {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Decode backslash escapes. Unknown escapes yield the escaped character.
pub fn decode_escapes(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            decoded.push('\\');
            break;
        };
        decoded.push(match escaped {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '0' => '\0',
            other => other,
        });
    }

    decoded
}

/// Inverse of [`decode_escapes`] for text placed inside a char or string literal.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\x07' => escaped.push_str("\\a"),
            '\x08' => escaped.push_str("\\b"),
            '\x0c' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x0b' => escaped.push_str("\\v"),
            '\0' => escaped.push_str("\\0"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("int add(int a, int b) { return a + b; }");
        let tokens = lexer.tokenize().unwrap();

        use TokenKind::*;
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                Int, Id, LPar, Int, Id, Comma, Int, Id, RPar, LAcc, Return, Id, Add, Id,
                Semicolon, RAcc, End
            ]
        );
        assert_eq!(tokens[1].ident(), Some("add"));
        assert_eq!(tokens[3].location, SourceLocation::new(1, 9));
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("= == ! != < <= > >= && || + - * / ."),
            vec![
                Assign, Equal, Not, NotEq, Less, LessEq, Greater, GreaterEq, And, Or, Add, Sub,
                Mul, Div, Dot, End
            ]
        );
        // Maximal munch without separating whitespace
        assert_eq!(kinds("a<=b"), vec![Id, LessEq, Id, End]);
        assert_eq!(kinds("a=-b"), vec![Id, Assign, Sub, Id, End]);
    }

    #[test]
    fn test_maximal_munch_identifiers() {
        let tokens = Lexer::new("ab12 cd").tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].literal, Literal::Ident("ab12".to_string()));
        assert_eq!(tokens[1].literal, Literal::Ident("cd".to_string()));
        assert_eq!(tokens[1].location, SourceLocation::new(1, 6));
    }

    #[test]
    fn test_comments() {
        let source = "int x; // comment\nint y; /* block\ncomment */ int z; // trailing";
        let tokens = Lexer::new(source).tokenize().unwrap();

        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[4].ident(), Some("y"));
        assert_eq!(tokens[4].location, SourceLocation::new(2, 5));
        assert_eq!(tokens[7].ident(), Some("z"));
        assert_eq!(tokens[7].location, SourceLocation::new(3, 16));
    }

    #[test]
    fn test_comment_star_runs() {
        use TokenKind::*;
        assert_eq!(kinds("a /*** x **/ b"), vec![Id, Id, End]);
        assert_eq!(kinds("a / b"), vec![Id, Div, Id, End]);
    }

    #[rstest]
    #[case("0x1F", Literal::Int(31))]
    #[case("017", Literal::Int(15))]
    #[case("17", Literal::Int(17))]
    #[case("0", Literal::Int(0))]
    #[case("1.5e2", Literal::Float(150.0))]
    #[case("2.25", Literal::Float(2.25))]
    #[case("3e-1", Literal::Float(0.3))]
    #[case("0.5", Literal::Float(0.5))]
    fn test_numeric_literals(#[case] source: &str, #[case] expected: Literal) {
        let tokens = Lexer::new(source).tokenize().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].literal, expected);
    }

    #[rstest]
    #[case(r"'a'", 'a')]
    #[case(r"'\n'", '\n')]
    #[case(r"'\0'", '\0')]
    #[case(r"'\\'", '\\')]
    #[case(r"'\''", '\'')]
    #[case(r"'\q'", 'q')]
    fn test_char_literals(#[case] source: &str, #[case] expected: char) {
        let tokens = Lexer::new(source).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CtChar);
        assert_eq!(tokens[0].literal, Literal::Char(expected));
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""a\nb""#).tokenize().unwrap();
        assert_eq!(tokens[0].literal, Literal::Str("a\nb".to_string()));

        let tokens = Lexer::new(r#""tab\there \"q\" \\""#).tokenize().unwrap();
        assert_eq!(tokens[0].literal, Literal::Str("tab\there \"q\" \\".to_string()));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "a\nb\t\"c\"\\\0\x07";
        let encoded = escape_text(original);
        assert_eq!(decode_escapes(&encoded), original);
    }

    #[test]
    fn test_rescan_printed_tokens() {
        let source = "struct P { int x; }; double f(char s[]) { if (!s[0] || 1.5 >= 0x10) \
                      return 'z'; put_s(\"hi\\n\"); }";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let printed = tokens
            .iter()
            .map(|t| t.source_text())
            .collect::<Vec<_>>()
            .join(" ");
        let rescanned = Lexer::new(&printed).tokenize().unwrap();

        assert_eq!(
            tokens.iter().map(|t| (t.kind, &t.literal)).collect::<Vec<_>>(),
            rescanned.iter().map(|t| (t.kind, &t.literal)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("int x;\n  x @ 1;").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(2, 5));
        assert!(err.to_string().starts_with("Lexical error at line 2, column 5"));
    }

    #[test]
    fn test_single_ampersand_is_rejected() {
        let err = Lexer::new("a & b").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 4));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("int x; /* never closed").tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated block comment");
        assert_eq!(err.location, SourceLocation::new(1, 23));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("\"abc\nx").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_invalid_octal() {
        let err = Lexer::new("x = 089;").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_overflowing_real() {
        let err = Lexer::new("d = 1e999;").tokenize().unwrap_err();
        assert_eq!(err.message, "Real literal out of range: 1e999");
        assert_eq!(err.location, SourceLocation::new(1, 5));

        let tokens = Lexer::new("1.7e308").tokenize().unwrap();
        assert_eq!(tokens[0].source_text(), format!("{:?}", 1.7e308_f64));
    }

    #[test]
    fn test_end_token_position() {
        let tokens = Lexer::new("x\ny").tokenize().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::End);
        assert_eq!(tokens[2].location, SourceLocation::new(2, 2));
    }
}
