//! Expression validation and typing
//!
//! [`Validator::expr`] checks an expression bottom-up, records the resulting
//! type in [`Expr::ty`] and returns it.
//!
//! # Typing Rules
//!
//! - Variable: its declared type
//! - Constant: fixed by the literal (`char[len + 1]` for strings)
//! - Cast: the target type
//! - Call: the callee's return type
//! - Index: the element type of the array
//! - Member: the member's declared type
//! - Assignment: the type of the left operand
//! - Logical and comparison operators: `int`
//! - Arithmetic operators: the larger operand type

use crate::parser::ast::*;
use crate::semantic::errors::SemanticError;
use crate::semantic::symbols::Symbol;
use crate::semantic::types::{
    check_arithmetic, check_explicit_cast, check_implicit_cast, const_value, is_const,
    is_integral, larger_type, value_type,
};
use crate::semantic::validate::Validator;

impl Validator {
    /// Validate `expr`, record its type on the node and return it.
    pub(crate) fn expr(&mut self, expr: &mut Expr) -> Result<Type, SemanticError> {
        let location = expr.location;
        let ty = match &mut expr.kind {
            ExprKind::Variable(name) => self.variable(name, location)?,

            ExprKind::Constant(value) => value_type(value, location),

            ExprKind::Cast { target_type, expr } => {
                self.resolve_type(target_type, location)?;
                let source = self.expr(expr)?;
                check_explicit_cast(&source, target_type, location)?;
                target_type.clone()
            }

            ExprKind::FunctionCall { name, args } => self.call(name, args, location)?,

            ExprKind::UnaryOp { op, operand } => {
                let ty = self.expr(operand)?;
                check_arithmetic(&ty, operand.location)?;
                match op {
                    UnOp::Neg => ty,
                    UnOp::Not => Type::int(),
                }
            }

            ExprKind::ArrayAccess { array, index } => {
                let base = self.expr(array)?;
                if !base.is_array {
                    return Err(SemanticError::type_error(
                        format!("Cannot index a value of type {}", base),
                        array.location,
                    ));
                }
                let index_type = self.expr(index)?;
                if !is_integral(&index_type) {
                    return Err(SemanticError::type_error(
                        format!("Array index must be an integer (got {})", index_type),
                        index.location,
                    ));
                }
                base.element()
            }

            ExprKind::MemberAccess { object, member } => {
                let base = self.expr(object)?;
                self.member(&base, member, location)?
            }

            ExprKind::BinaryOp { op, left, right } => {
                let op = *op;
                let left_type = self.expr(left)?;
                let right_type = self.expr(right)?;
                match op {
                    BinOp::Assign => {
                        if !left.is_lvalue() {
                            return Err(SemanticError::type_error(
                                "Cannot assign to a non-lvalue",
                                left.location,
                            ));
                        }
                        if left_type.is_array {
                            return Err(SemanticError::type_error(
                                format!("Cannot assign to an array of type {}", left_type),
                                left.location,
                            ));
                        }
                        check_implicit_cast(&right_type, &left_type, location)?;
                        left_type
                    }
                    BinOp::Or
                    | BinOp::And
                    | BinOp::Eq
                    | BinOp::Ne
                    | BinOp::Lt
                    | BinOp::Le
                    | BinOp::Gt
                    | BinOp::Ge => {
                        larger_type(&left_type, &right_type, location)?;
                        Type::int()
                    }
                    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                        let ty = larger_type(&left_type, &right_type, location)?;
                        if op == BinOp::Div && is_const(right) {
                            // Reports division by a constant zero.
                            const_value(right).and_then(|divisor| match divisor {
                                Value::Int(0) => Err(zero_division(location)),
                                Value::Float(d) if d == 0.0 => Err(zero_division(location)),
                                Value::Char('\0') => Err(zero_division(location)),
                                _ => Ok(()),
                            })?;
                        }
                        ty
                    }
                }
            }
        };

        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    fn variable(&self, name: &str, location: SourceLocation) -> Result<Type, SemanticError> {
        match self.symbols.get(self.scope, name, location)? {
            Symbol::Variable { ty, .. } => Ok(ty.clone()),
            _ => Err(SemanticError::WrongSymbolKind {
                name: name.to_string(),
                expected: "variable",
                location,
            }),
        }
    }

    fn call(&mut self, name: &str, args: &mut [Expr], location: SourceLocation) -> Result<Type, SemanticError> {
        let sig = match self.symbols.get(self.scope, name, location)? {
            Symbol::Function(sig) => sig.clone(),
            _ => {
                return Err(SemanticError::WrongSymbolKind {
                    name: name.to_string(),
                    expected: "function",
                    location,
                })
            }
        };

        if args.len() != sig.params.len() {
            return Err(SemanticError::ArgumentCountMismatch {
                function: sig.name,
                expected: sig.params.len(),
                got: args.len(),
                location,
            });
        }

        for (arg, param) in args.iter_mut().zip(&sig.params) {
            let ty = self.expr(arg)?;
            check_implicit_cast(&ty, param, arg.location)?;
        }
        Ok(sig.return_type)
    }

    fn member(&self, base: &Type, member: &str, location: SourceLocation) -> Result<Type, SemanticError> {
        let sref = match &base.kind {
            TypeKind::Struct(sref) if !base.is_array => sref,
            _ => {
                return Err(SemanticError::type_error(
                    format!("{} is not a struct", base),
                    location,
                ))
            }
        };

        let members = match sref.members {
            Some(members) => members,
            None => match self.symbols.get(self.scope, &sref.name, location)? {
                Symbol::Struct { members, .. } => *members,
                _ => return Err(not_a_struct(&sref.name, location)),
            },
        };

        match self.symbols.lookup_local(members, member) {
            Some(Symbol::Variable { ty, .. }) => Ok(ty.clone()),
            _ => Err(SemanticError::UnknownMember {
                struct_name: sref.name.clone(),
                member: member.to_string(),
                location,
            }),
        }
    }
}

pub(crate) fn not_a_struct(name: &str, location: SourceLocation) -> SemanticError {
    SemanticError::type_error(format!("{} is not a struct", name), location)
}

fn zero_division(location: SourceLocation) -> SemanticError {
    SemanticError::type_error("Division by zero in constant expression", location)
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;
    use crate::semantic::errors::{ErrorCategory, SemanticError};
    use crate::semantic::validate::validate;

    fn check(source: &str) -> Result<Program, SemanticError> {
        let mut program = Parser::new(source).unwrap().parse_program().unwrap();
        validate(&mut program)?;
        Ok(program)
    }

    /// Validate `decls` followed by `void t() { <expr>; }` and return the
    /// type recorded on `<expr>`.
    fn type_of(decls: &str, expr: &str) -> Result<Type, SemanticError> {
        let program = check(&format!("{} void t() {{ {}; }}", decls, expr))?;
        match program.declarations.last() {
            Some(Declaration::Function(f)) => match &f.body.items[..] {
                [BlockItem::Statement(Stmt::Expression { expr: Some(e), .. })] => {
                    Ok(e.ty.clone().expect("expression left untyped"))
                }
                other => panic!("unexpected body {:?}", other),
            },
            other => panic!("unexpected declaration {:?}", other),
        }
    }

    #[test]
    fn test_constant_types() {
        assert_eq!(type_of("", "1").unwrap(), Type::int());
        assert_eq!(type_of("", "1.5").unwrap(), Type::float());
        assert_eq!(type_of("", "'a'").unwrap(), Type::char());
        assert_eq!(type_of("", "\"hi\"").unwrap().to_string(), "char[3]");
    }

    #[test]
    fn test_arithmetic_uses_larger_type() {
        assert_eq!(type_of("char c; int i;", "c + c").unwrap(), Type::char());
        assert_eq!(type_of("char c; int i;", "c * i").unwrap(), Type::int());
        assert_eq!(type_of("int i; double d;", "i - d").unwrap(), Type::float());
        assert_eq!(type_of("double d;", "-d").unwrap(), Type::float());
    }

    #[test]
    fn test_logic_and_comparison_yield_int() {
        assert_eq!(type_of("double d;", "d < 1.0").unwrap(), Type::int());
        assert_eq!(type_of("double d;", "d && 1").unwrap(), Type::int());
        assert_eq!(type_of("double d;", "!d").unwrap(), Type::int());
    }

    #[test]
    fn test_index_and_member_access() {
        let decls = "struct P { int x; double v[3]; }; struct P ps[4];";
        assert_eq!(type_of(decls, "ps[1].v[2]").unwrap(), Type::float());
        assert_eq!(type_of(decls, "ps['a'].x").unwrap(), Type::int());

        let err = type_of(decls, "ps[1].y").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert!(err.to_string().contains("struct P has no member y"));

        let err = type_of(decls, "ps.x").unwrap_err();
        assert!(err.to_string().contains("is not a struct"));

        let err = type_of(decls, "ps[1.0]").unwrap_err();
        assert!(err.to_string().contains("Array index must be an integer"));

        let err = type_of("int n;", "n[0]").unwrap_err();
        assert!(err.to_string().contains("Cannot index"));
    }

    #[test]
    fn test_assignment_rules() {
        assert_eq!(type_of("double d;", "d = 1").unwrap(), Type::float());

        let err = type_of("int x;", "1 = x").unwrap_err();
        assert!(err.to_string().contains("non-lvalue"));

        let err = type_of("int a[2]; int b[2];", "a = b").unwrap_err();
        assert!(err.to_string().contains("Cannot assign to an array"));

        let err = type_of("int i; double d;", "i = d").unwrap_err();
        assert!(err.to_string().contains("loses precision"));

        assert_eq!(type_of("int i; double d;", "i = (int)d").unwrap(), Type::int());
    }

    #[test]
    fn test_struct_assignment() {
        let decls = "struct A { int x; }; struct B { int x; }; struct A a1, a2; struct B b;";
        assert_eq!(type_of(decls, "a1 = a2").unwrap().to_string(), "struct A");

        let err = type_of(decls, "a1 = b").unwrap_err();
        assert!(err.to_string().contains("Different struct types"));
    }

    #[test]
    fn test_calls() {
        assert_eq!(type_of("", "get_d()").unwrap(), Type::float());
        assert!(type_of("", "put_s(\"hello\")").unwrap().is_void());
        assert!(type_of("", "put_d(get_i())").unwrap().is_void());

        let err = type_of("", "put_i(1, 2)").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert!(matches!(
            err,
            SemanticError::ArgumentCountMismatch { expected: 1, got: 2, .. }
        ));

        let err = type_of("", "put_i(\"x\")").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);

        let err = type_of("int f;", "f()").unwrap_err();
        assert!(matches!(err, SemanticError::WrongSymbolKind { expected: "function", .. }));

        let err = type_of("", "put_i").unwrap_err();
        assert!(matches!(err, SemanticError::WrongSymbolKind { expected: "variable", .. }));

        let err = type_of("", "nope(1)").unwrap_err();
        assert!(matches!(err, SemanticError::UndefinedSymbol { .. }));
    }

    #[test]
    fn test_recursive_call() {
        check("int fact(int n) { if (n < 2) return 1; return n * fact(n - 1); }").unwrap();
    }

    #[test]
    fn test_casts() {
        assert_eq!(type_of("double d;", "(char)d").unwrap(), Type::char());

        let err = type_of("struct S { int a; }; struct S s;", "(int)s").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);

        let err = type_of("int a[3];", "(int[4])a").unwrap_err();
        assert!(err.to_string().contains("Array size does not match (3, 4)"));

        assert_eq!(type_of("int a[3];", "(int[])a").unwrap().to_string(), "int[]");
    }

    #[test]
    fn test_non_arithmetic_operands() {
        let err = type_of("int a[2];", "a + 1").unwrap_err();
        assert!(err.to_string().contains("Cannot use arrays in arithmetic"));

        let err = type_of("", "put_i(1) + 1").unwrap_err();
        assert!(err.to_string().contains("Expected one of char, int or float (got void)"));
    }

    #[test]
    fn test_division_by_constant_zero() {
        let err = type_of("int x;", "x / (2 - 2)").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(err.to_string().contains("Division by zero"));

        assert_eq!(type_of("int x;", "x / 2").unwrap(), Type::int());
    }

    #[test]
    fn test_nested_expressions_are_decorated() {
        let program = check("void t() { int x; x = 1 + 2 * x; }").unwrap();
        let Some(Declaration::Function(f)) = program.declarations.first() else {
            panic!("expected a function");
        };
        let BlockItem::Statement(Stmt::Expression { expr: Some(assign), .. }) = &f.body.items[1] else {
            panic!("expected an expression statement");
        };
        let ExprKind::BinaryOp { right, .. } = &assign.kind else {
            panic!("expected an assignment");
        };
        assert_eq!(right.ty, Some(Type::int()));
        let ExprKind::BinaryOp { right: product, .. } = &right.kind else {
            panic!("expected an addition");
        };
        assert_eq!(product.ty, Some(Type::int()));
    }
}
