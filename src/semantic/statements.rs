//! Statement validation
//!
//! Conditions of `if`, `while` and `for` must be arithmetic. `break` needs an
//! enclosing loop and `return` an enclosing function whose return type
//! agrees with the presence and type of the returned value.

use crate::parser::ast::*;
use crate::semantic::errors::SemanticError;
use crate::semantic::types::{check_arithmetic, check_implicit_cast};
use crate::semantic::validate::Validator;

impl Validator {
    /// Validate the items of a block in the current scope.
    pub(crate) fn block_items(&mut self, items: &mut [BlockItem]) -> Result<(), SemanticError> {
        for item in items {
            match item {
                BlockItem::Declaration(decl) => self.var_decl(decl)?,
                BlockItem::Statement(stmt) => self.stmt(stmt)?,
            }
        }
        Ok(())
    }

    pub(crate) fn stmt(&mut self, stmt: &mut Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Block(block) => self.in_new_scope(|v| v.block_items(&mut block.items)),

            Stmt::Expression { expr, .. } => {
                if let Some(expr) = expr {
                    self.expr(expr)?;
                }
                Ok(())
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.condition(condition)?;
                self.stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch)?;
                }
                Ok(())
            }

            Stmt::While {
                condition, body, ..
            } => {
                self.condition(condition)?;
                self.in_loop(|v| v.stmt(body))
            }

            Stmt::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.expr(init)?;
                }
                if let Some(condition) = condition {
                    self.condition(condition)?;
                }
                if let Some(increment) = increment {
                    self.expr(increment)?;
                }
                self.in_loop(|v| v.stmt(body))
            }

            Stmt::Break { location } => {
                if !self.context.in_loop() {
                    return Err(SemanticError::BreakOutsideLoop {
                        location: *location,
                    });
                }
                Ok(())
            }

            Stmt::Return { expr, location } => self.return_stmt(expr.as_mut(), *location),
        }
    }

    fn condition(&mut self, condition: &mut Expr) -> Result<(), SemanticError> {
        let ty = self.expr(condition)?;
        check_arithmetic(&ty, condition.location)
    }

    fn return_stmt(&mut self, expr: Option<&mut Expr>, location: SourceLocation) -> Result<(), SemanticError> {
        let return_type = match self.context.function() {
            Some(sig) => sig.return_type.clone(),
            None => return Err(SemanticError::ReturnOutsideFunction { location }),
        };

        match expr {
            Some(expr) if return_type.is_void() => Err(SemanticError::type_error(
                "Cannot return a value from a void function",
                expr.location,
            )),
            Some(expr) => {
                let ty = self.expr(expr)?;
                check_implicit_cast(&ty, &return_type, expr.location)
            }
            None if return_type.is_void() => Ok(()),
            None => Err(SemanticError::type_error(
                format!("Missing return value in function returning {}", return_type),
                location,
            )),
        }
    }
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

    /// The type recorded on the expression of the first statement of `f`'s
    /// innermost first block.
    fn first_expr_type(program: &Program) -> Option<Type> {
        fn in_block(items: &[BlockItem]) -> Option<Type> {
            items.iter().find_map(|item| match item {
                BlockItem::Statement(Stmt::Expression { expr: Some(e), .. }) => e.ty.clone(),
                BlockItem::Statement(Stmt::Block(block)) => in_block(&block.items),
                _ => None,
            })
        }
        program.declarations.iter().find_map(|d| match d {
            Declaration::Function(f) => in_block(&f.body.items),
            _ => None,
        })
    }

    #[test]
    fn test_scope_shadowing_uses_inner_type() {
        let program = check("void f() { int x; { double x; { x; } } }").unwrap();
        assert_eq!(first_expr_type(&program), Some(Type::float()));
    }

    #[test]
    fn test_duplicate_in_same_block() {
        let err = check("void f() {\n  int x;\n  int x;\n}").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert_eq!(err.location(), SourceLocation::new(3, 7));
    }

    #[test]
    fn test_block_scope_ends_with_block() {
        let err = check("void f() { { int y; } y = 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::UndefinedSymbol { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_break_placement() {
        let err = check("void f() { break; }").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert!(matches!(err, SemanticError::BreakOutsideLoop { .. }));

        check("void f() { while (1) break; }").unwrap();
        check("void f() { for (;;) { if (1) break; } }").unwrap();

        let err = check("void f() { while (1) { } break; }").unwrap_err();
        assert!(matches!(err, SemanticError::BreakOutsideLoop { .. }));
    }

    #[test]
    fn test_return_rules() {
        let err = check("void f() { return 5; }").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);

        let err = check("int f() { return; }").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(err.to_string().contains("Missing return value"));

        check("void f() { return; }").unwrap();
        check("double f() { return 1; }").unwrap();

        let err = check("int f() { return 1.5; }").unwrap_err();
        assert!(err.to_string().contains("loses precision"));
    }

    #[test]
    fn test_array_return_type() {
        check("char *id(char s[]) { return s; } void g() { char t[4]; id(t); }").unwrap();

        let err = check("int *f() { return 1; }").unwrap_err();
        assert!(err.to_string().contains("Cast between array and non-array types"));
    }

    #[test]
    fn test_conditions_must_be_arithmetic() {
        check("void f() { char c; double d; if (c) ; while (d > 0.5) ; for (; c < 3;) ; }").unwrap();

        let err = check("struct S { int a; }; void f() { struct S s; if (s) ; }").unwrap_err();
        assert!(err.to_string().contains("Expected one of char, int or float"));

        let err = check("void f() { int a[3]; while (a) ; }").unwrap_err();
        assert!(err.to_string().contains("Cannot use arrays in arithmetic"));
    }
}
