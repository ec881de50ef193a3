//! Expression parsing implementation
//!
//! # Grammar
//!
//! ```text
//! expr        ::= exprAssign
//! exprAssign  ::= exprUnary "=" exprAssign | exprOr
//! exprOr      ::= exprAnd ( "||" exprAnd )*
//! exprAnd     ::= exprEq ( "&&" exprEq )*
//! exprEq      ::= exprRel ( ( "==" | "!=" ) exprRel )*
//! exprRel     ::= exprAdd ( ( "<" | "<=" | ">" | ">=" ) exprAdd )*
//! exprAdd     ::= exprMul ( ( "+" | "-" ) exprMul )*
//! exprMul     ::= exprCast ( ( "*" | "/" ) exprCast )*
//! exprCast    ::= "(" typeName ")" exprCast | exprUnary
//! exprUnary   ::= ( "-" | "!" ) exprUnary | exprPostfix
//! exprPostfix ::= exprPrimary ( "[" expr "]" | "." ID )*
//! exprPrimary ::= ID ( "(" ( expr ( "," expr )* )? ")" )?
//!               | CT_INT | CT_REAL | CT_CHAR | CT_STRING
//!               | "(" expr ")"
//! ```
//!
//! The left-recursive levels are parsed as one operand followed by a `many`
//! of (operator, operand) pairs, folded left so that `a - b - c` groups as
//! `(a - b) - c`. Binary nodes are located at their operator.

use crate::parser::ast::*;
use crate::parser::parse::{Committed, Failure, PResult, Parser, Rule};
use crate::parser::token::{Literal, TokenKind};

const OR_OPS: &[(TokenKind, BinOp)] = &[(TokenKind::Or, BinOp::Or)];
const AND_OPS: &[(TokenKind, BinOp)] = &[(TokenKind::And, BinOp::And)];
const EQUALITY_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Equal, BinOp::Eq),
    (TokenKind::NotEq, BinOp::Ne),
];
const RELATIONAL_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Less, BinOp::Lt),
    (TokenKind::LessEq, BinOp::Le),
    (TokenKind::Greater, BinOp::Gt),
    (TokenKind::GreaterEq, BinOp::Ge),
];
const ADDITIVE_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Add, BinOp::Add),
    (TokenKind::Sub, BinOp::Sub),
];
const MULTIPLICATIVE_OPS: &[(TokenKind, BinOp)] = &[
    (TokenKind::Mul, BinOp::Mul),
    (TokenKind::Div, BinOp::Div),
];

/// A postfix suffix waiting to be folded onto its base expression
enum Postfix {
    Index(Expr, SourceLocation),
    Member(String, SourceLocation),
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn expr(&mut self) -> PResult<Expr> {
        self.nested(Self::expr_assign)
    }

    fn expr_assign(&mut self) -> PResult<Expr> {
        self.choice(&[
            |p: &mut Parser| {
                let target = p.expr_unary()?;
                let location = p.consume(TokenKind::Assign, "'='")?.location;
                let value = p.expr_assign().cut()?;
                Ok(Expr::binary(BinOp::Assign, target, value, location))
            },
            Self::expr_or,
        ])
    }

    fn expr_or(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_and, OR_OPS)
    }

    fn expr_and(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_eq, AND_OPS)
    }

    fn expr_eq(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_rel, EQUALITY_OPS)
    }

    fn expr_rel(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_add, RELATIONAL_OPS)
    }

    fn expr_add(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_mul, ADDITIVE_OPS)
    }

    fn expr_mul(&mut self) -> PResult<Expr> {
        self.binary_chain(Self::expr_cast, MULTIPLICATIVE_OPS)
    }

    /// One left-associative precedence level.
    fn binary_chain(&mut self, operand: Rule<Expr>, operators: &[(TokenKind, BinOp)]) -> PResult<Expr> {
        let first = operand(self)?;
        let tail = self.many(
            |p| {
                let (op, location) = p.binary_operator(operators)?;
                let right = operand(p).cut()?;
                Ok((op, location, right))
            },
            false,
        )?;

        Ok(tail
            .into_iter()
            .fold(first, |left, (op, location, right)| {
                Expr::binary(op, left, right, location)
            }))
    }

    fn binary_operator(&mut self, operators: &[(TokenKind, BinOp)]) -> PResult<(BinOp, SourceLocation)> {
        for &(kind, op) in operators {
            if self.check(kind) {
                let location = self.current_location();
                self.advance();
                return Ok((op, location));
            }
        }
        let expected = operators
            .iter()
            .map(|(_, op)| format!("'{}'", op.symbol()))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(Failure::Soft(self.unexpected(&expected)))
    }

    fn expr_cast(&mut self) -> PResult<Expr> {
        self.choice(&[
            |p: &mut Parser| {
                let location = p.consume(TokenKind::LPar, "'('")?.location;
                let target_type = p.type_name()?;
                p.consume(TokenKind::RPar, "')' after cast type").cut()?;
                let expr = p.expr_cast().cut()?;
                Ok(Expr::new(
                    ExprKind::Cast {
                        target_type,
                        expr: Box::new(expr),
                    },
                    location,
                ))
            },
            Self::expr_unary,
        ])
    }

    /// Both `expr_assign` alternatives start with a unary expression, so it is
    /// parsed once per position.
    fn expr_unary(&mut self) -> PResult<Expr> {
        self.memoized(Self::unary)
    }

    fn unary(&mut self) -> PResult<Expr> {
        self.choice(&[
            |p: &mut Parser| {
                let location = p.current_location();
                let op = if p.check(TokenKind::Sub) {
                    UnOp::Neg
                } else if p.check(TokenKind::Not) {
                    UnOp::Not
                } else {
                    return Err(Failure::Soft(p.unexpected("'-' or '!'")));
                };
                p.advance();
                let operand = p.expr_unary().cut()?;
                Ok(Expr::new(
                    ExprKind::UnaryOp {
                        op,
                        operand: Box::new(operand),
                    },
                    location,
                ))
            },
            Self::expr_postfix,
        ])
    }

    fn expr_postfix(&mut self) -> PResult<Expr> {
        let base = self.expr_primary()?;
        let suffixes = self.many(
            |p| p.choice(&[Self::index_suffix, Self::member_suffix]),
            false,
        )?;

        Ok(suffixes.into_iter().fold(base, |base, suffix| match suffix {
            Postfix::Index(index, location) => Expr::new(
                ExprKind::ArrayAccess {
                    array: Box::new(base),
                    index: Box::new(index),
                },
                location,
            ),
            Postfix::Member(member, location) => Expr::new(
                ExprKind::MemberAccess {
                    object: Box::new(base),
                    member,
                },
                location,
            ),
        }))
    }

    fn index_suffix(&mut self) -> PResult<Postfix> {
        let location = self.consume(TokenKind::LBracket, "'['")?.location;
        let index = self.expr().cut()?;
        self.consume(TokenKind::RBracket, "']' after index").cut()?;
        Ok(Postfix::Index(index, location))
    }

    fn member_suffix(&mut self) -> PResult<Postfix> {
        let location = self.consume(TokenKind::Dot, "'.'")?.location;
        let (member, _) = self.identifier("member name").cut()?;
        Ok(Postfix::Member(member, location))
    }

    fn expr_primary(&mut self) -> PResult<Expr> {
        self.choice(&[
            Self::call_or_variable,
            Self::constant,
            |p: &mut Parser| {
                p.consume(TokenKind::LPar, "'('")?;
                // Not committed yet: "(int)" reaches here before the cast rule.
                let expr = p.expr()?;
                p.consume(TokenKind::RPar, "')'").cut()?;
                Ok(expr)
            },
        ])
    }

    fn call_or_variable(&mut self) -> PResult<Expr> {
        let (name, location) = self.identifier("identifier")?;

        if self.optional(|p| p.consume(TokenKind::LPar, "'('"))?.is_none() {
            return Ok(Expr::new(ExprKind::Variable(name), location));
        }

        let mut args = Vec::new();
        if let Some(first) = self.optional(Self::expr)? {
            args.push(first);
            let rest = self.many(
                |p| {
                    p.consume(TokenKind::Comma, "','")?;
                    p.expr().cut()
                },
                false,
            )?;
            args.extend(rest);
        }
        self.consume(TokenKind::RPar, "')' after arguments").cut()?;

        Ok(Expr::new(ExprKind::FunctionCall { name, args }, location))
    }

    fn constant(&mut self) -> PResult<Expr> {
        let token = self.peek().clone();
        let value = match (token.kind, token.literal) {
            (TokenKind::CtInt, Literal::Int(n)) => Value::Int(n),
            (TokenKind::CtReal, Literal::Float(x)) => Value::Float(x),
            (TokenKind::CtChar, Literal::Char(c)) => Value::Char(c),
            (TokenKind::CtString, Literal::Str(s)) => Value::Str(s),
            _ => return Err(Failure::Soft(self.unexpected("constant"))),
        };
        self.advance();
        Ok(Expr::constant(value, token.location))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;
    use rstest::rstest;

    /// Parse `source` as the single expression statement of a function body.
    fn expr(source: &str) -> Expr {
        let wrapped = format!("void f() {{ {}; }}", source);
        let program = Parser::new(&wrapped).unwrap().parse_program().unwrap();
        match program.declarations.into_iter().next() {
            Some(Declaration::Function(func)) => match func.body.items.into_iter().next() {
                Some(BlockItem::Statement(Stmt::Expression { expr: Some(e), .. })) => e,
                other => panic!("Expected expression statement, got {:?}", other),
            },
            other => panic!("Expected function, got {:?}", other),
        }
    }

    /// Render an expression fully parenthesised.
    fn show(e: &Expr) -> String {
        match &e.kind {
            ExprKind::Variable(name) => name.clone(),
            ExprKind::Constant(Value::Int(n)) => n.to_string(),
            ExprKind::Constant(Value::Float(x)) => format!("{:?}", x),
            ExprKind::Constant(Value::Char(c)) => format!("{:?}", c),
            ExprKind::Constant(Value::Str(s)) => format!("{:?}", s),
            ExprKind::Cast { target_type, expr } => format!("(cast {:?} {})", target_type.kind, show(expr)),
            ExprKind::FunctionCall { name, args } => format!(
                "{}({})",
                name,
                args.iter().map(show).collect::<Vec<_>>().join(", ")
            ),
            ExprKind::UnaryOp { op: UnOp::Neg, operand } => format!("(-{})", show(operand)),
            ExprKind::UnaryOp { op: UnOp::Not, operand } => format!("(!{})", show(operand)),
            ExprKind::ArrayAccess { array, index } => format!("{}[{}]", show(array), show(index)),
            ExprKind::MemberAccess { object, member } => format!("{}.{}", show(object), member),
            ExprKind::BinaryOp { op, left, right } => {
                format!("({} {} {})", show(left), op.symbol(), show(right))
            }
        }
    }

    #[rstest]
    #[case("a - b - c", "((a - b) - c)")]
    #[case("1 + 2 * 3", "(1 + (2 * 3))")]
    #[case("a || b && c == d < e + f * g", "(a || (b && (c == (d < (e + (f * g))))))")]
    #[case("a = b = c", "(a = (b = c))")]
    #[case("a[i].x = -b", "(a[i].x = (-b))")]
    #[case("!!a", "(!(!a))")]
    #[case("(a + b) * c", "((a + b) * c)")]
    #[case("f(1, g(x), 'c')", "f(1, g(x), 'c')")]
    #[case("f()", "f()")]
    #[case("(int)x / 2", "((cast Int x) / 2)")]
    #[case("(double)(char)x", "(cast Float (cast Char x))")]
    #[case("s.p[0].q", "s.p[0].q")]
    fn test_precedence_and_associativity(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(show(&expr(source)), expected);
    }

    #[test]
    fn test_binary_location_is_operator() {
        let e = expr("a +   b");
        assert_eq!(e.location, SourceLocation::new(1, 14));
    }

    #[test]
    fn test_backtracking_leaves_no_trace() {
        // The assignment alternative consumes `a[1]` before failing on `+`;
        // the result must be exactly what the exprOr alternative builds.
        let e = expr("a[1] + 2");
        assert_eq!(show(&e), "(a[1] + 2)");
        assert!(matches!(e.kind, ExprKind::BinaryOp { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_deep_nesting_parses_in_linear_time() {
        let depth = 40;
        let started = std::time::Instant::now();

        let parens = format!("x = {}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(show(&expr(&parens)), "(x = 1)");

        let calls = format!("{}1{}", "g(".repeat(depth), ")".repeat(depth));
        let mut e = expr(&calls);
        let mut levels = 0;
        while let ExprKind::FunctionCall { name, mut args } = e.kind {
            assert_eq!(name, "g");
            assert_eq!(args.len(), 1);
            e = args.remove(0);
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(e.kind, ExprKind::Constant(Value::Int(1)));

        let mixed = format!("{}-a{}", "(g(".repeat(depth), "))".repeat(depth));
        assert!(show(&expr(&mixed)).ends_with("(-a)))"));

        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_replayed_unary_keeps_casts_and_assignments() {
        assert_eq!(show(&expr("(a) = (b) + (int)(c)")), "(a = (b + (cast Int c)))");
        assert_eq!(show(&expr("(a) = (int)-b")), "(a = (cast Int (-b)))");
        assert_eq!(show(&expr("-(a) * -(a)")), "((-a) * (-a))");
    }

    #[test]
    fn test_string_constant() {
        let e = expr("put_s(\"hi\")");
        match e.kind {
            ExprKind::FunctionCall { args, .. } => {
                assert_eq!(args[0].kind, ExprKind::Constant(Value::Str("hi".to_string())))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_operand_is_committed() {
        let err = Parser::new("void f() { a + ; }")
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(err.to_string().contains("line 1, column 16"), "{}", err);
    }
}
