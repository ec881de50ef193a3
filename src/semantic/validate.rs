//! Validator core and declaration checks
//!
//! [`Validator`] walks a [`Program`] in pre-order, binding declarations as it
//! meets them and decorating every expression with its type. The walk stops
//! at the first [`SemanticError`].
//!
//! # Scopes
//!
//! - Struct members get a scope of their own, remembered by the struct symbol.
//! - A function's parameters and the outermost block of its body share one
//!   scope, so a local cannot redeclare a parameter.
//! - Every nested compound statement opens a new scope.
//!
//! Statement and expression rules live in `statements` and `expressions`
//! as further `impl Validator` blocks.

use crate::parser::ast::*;
use crate::semantic::builtins;
use crate::semantic::context::Context;
use crate::semantic::errors::SemanticError;
use crate::semantic::expressions::not_a_struct;
use crate::semantic::symbols::{FunctionSig, ScopeId, Symbol, SymbolTable};
use crate::semantic::types::{const_value, is_const};
use log::{debug, trace};

pub struct Validator {
    pub(crate) symbols: SymbolTable,
    pub(crate) scope: ScopeId,
    pub(crate) context: Context,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(SymbolTable::new())
    }
}

impl Validator {
    /// Validate against `symbols`, starting in its root scope.
    pub fn new(symbols: SymbolTable) -> Self {
        let scope = symbols.root();
        Validator {
            symbols,
            scope,
            context: Context::new(),
        }
    }

    /// A validator whose root scope already holds the builtin functions.
    pub fn with_builtins() -> Result<Self, SemanticError> {
        let mut symbols = SymbolTable::new();
        builtins::install(&mut symbols)?;
        Ok(Self::new(symbols))
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Validate a whole translation unit.
    pub fn validate(&mut self, program: &mut Program) -> Result<(), SemanticError> {
        for declaration in &mut program.declarations {
            self.declaration(declaration)?;
        }
        Ok(())
    }

    // ===== Scoped state =====

    /// Run `f` with `scope` as the current scope.
    pub(crate) fn in_scope<T>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Run `f` in a fresh scope nested in the current one.
    pub(crate) fn in_new_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        let scope = self.symbols.push_scope(self.scope);
        trace!("opened scope {:?} in {:?}", scope, self.scope);
        self.in_scope(scope, f)
    }

    pub(crate) fn in_function<T>(
        &mut self,
        sig: FunctionSig,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        let previous = self.context.enter_function(sig);
        let result = f(self);
        self.context.leave_function(previous);
        result
    }

    pub(crate) fn in_loop<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        self.context.enter_loop();
        let result = f(self);
        self.context.leave_loop();
        result
    }

    // ===== Declarations =====

    fn declaration(&mut self, declaration: &mut Declaration) -> Result<(), SemanticError> {
        match declaration {
            Declaration::Struct(decl) => {
                debug!("validating struct {} at {:?}", decl.name, decl.location);
                self.struct_decl(decl)
            }
            Declaration::Function(decl) => {
                debug!("validating function {} at {:?}", decl.name, decl.location);
                self.function_decl(decl)
            }
            Declaration::Variable(decl) => {
                debug!("validating global {} at {:?}", decl.name, decl.location);
                self.var_decl(decl)
            }
        }
    }

    fn struct_decl(&mut self, decl: &mut StructDecl) -> Result<(), SemanticError> {
        let members = self.symbols.push_scope(self.scope);
        self.symbols.insert(
            self.scope,
            &decl.name,
            Symbol::Struct {
                name: decl.name.clone(),
                members,
                location: decl.location,
            },
        )?;

        self.in_scope(members, |v| {
            decl.members.iter_mut().try_for_each(|member| v.var_decl(member))
        })
    }

    fn function_decl(&mut self, decl: &mut FunctionDecl) -> Result<(), SemanticError> {
        self.resolve_type(&mut decl.return_type, decl.location)?;
        for param in &mut decl.params {
            self.resolve_type(&mut param.var_type, param.location)?;
        }

        let sig = FunctionSig {
            name: decl.name.clone(),
            return_type: decl.return_type.clone(),
            params: decl.params.iter().map(|p| p.var_type.clone()).collect(),
            location: decl.location,
        };
        // Bound before the body so that recursive calls resolve.
        self.symbols
            .insert(self.scope, &decl.name, Symbol::Function(sig.clone()))?;

        self.in_function(sig, |v| {
            v.in_new_scope(|v| {
                for param in &decl.params {
                    v.bind_variable(param)?;
                }
                v.block_items(&mut decl.body.items)
            })
        })
    }

    /// Check a variable's type and bind it in the current scope.
    pub(crate) fn var_decl(&mut self, decl: &mut VarDecl) -> Result<(), SemanticError> {
        self.resolve_type(&mut decl.var_type, decl.location)?;
        self.bind_variable(decl)
    }

    fn bind_variable(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        self.symbols.insert(
            self.scope,
            &decl.name,
            Symbol::Variable {
                ty: decl.var_type.clone(),
                location: decl.location,
            },
        )
    }

    // ===== Types =====

    /// Resolve a struct name to its member scope and check an array bound:
    /// constant, integral, then positive.
    pub(crate) fn resolve_type(&mut self, ty: &mut Type, location: SourceLocation) -> Result<(), SemanticError> {
        if let TypeKind::Struct(sref) = &mut ty.kind {
            match self.symbols.get(self.scope, &sref.name, location)? {
                Symbol::Struct { members, .. } => sref.members = Some(*members),
                _ => return Err(not_a_struct(&sref.name, location)),
            }
        }

        if let Some(size) = ty.array_size.as_deref_mut() {
            if !is_const(size) {
                return Err(SemanticError::type_error(
                    "Array size must be a constant expression",
                    size.location,
                ));
            }
            let size_type = self.expr(size)?;
            if size_type.is_array || !matches!(size_type.kind, TypeKind::Int) {
                return Err(SemanticError::type_error(
                    "Array size must be an integer",
                    size.location,
                ));
            }
            match const_value(size)? {
                Value::Int(n) if n > 0 => {}
                _ => {
                    return Err(SemanticError::type_error(
                        "Array size must be greater than 0",
                        size.location,
                    ))
                }
            }
        }
        Ok(())
    }
}

/// Validate `program` with the builtin functions in scope.
pub fn validate(program: &mut Program) -> Result<SymbolTable, SemanticError> {
    let mut validator = Validator::with_builtins()?;
    validator.validate(program)?;
    Ok(validator.into_symbols())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::errors::ErrorCategory;
    use crate::parser::parse::Parser;

    pub(crate) fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    fn check(source: &str) -> Result<(), SemanticError> {
        validate(&mut parse(source)).map(|_| ())
    }

    #[test]
    fn test_globals_and_struct() {
        check("struct P { int x; double y[2]; }; struct P p; int n[10];").unwrap();
    }

    #[test]
    fn test_duplicate_global_reports_second_position() {
        let err = check("int x;\nchar x;").unwrap_err();
        assert_eq!(
            err,
            SemanticError::DuplicateSymbol {
                name: "x".to_string(),
                location: SourceLocation::new(2, 6),
            }
        );
    }

    #[test]
    fn test_duplicate_struct_member() {
        let err = check("struct S { int a; char a; };").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateSymbol { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_members_do_not_leak_into_enclosing_scope() {
        let err = check("struct S { int a; }; void f() { a = 1; }").unwrap_err();
        assert!(matches!(err, SemanticError::UndefinedSymbol { .. }));
    }

    #[test]
    fn test_unknown_struct_type() {
        let err = check("struct Q q;").unwrap_err();
        assert!(matches!(err, SemanticError::UndefinedSymbol { ref name, .. } if name == "Q"));

        let err = check("int Q; struct Q q;").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert_eq!(
            err.to_string(),
            "Type error at line 1, column 17: Q is not a struct"
        );

        let err = check("void Q() { } void f(struct Q q) { }").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn test_array_bounds() {
        let err = check("int a[0];").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
        assert!(err.to_string().contains("Array size must be greater than 0"));

        let err = check("int n; int a[n];").unwrap_err();
        assert!(err.to_string().contains("Array size must be a constant expression"));
        assert_eq!(err.location(), SourceLocation::new(1, 14));

        let err = check("int a[2.5];").unwrap_err();
        assert!(err.to_string().contains("Array size must be an integer"));

        let err = check("int a[2 - 3];").unwrap_err();
        assert!(err.to_string().contains("greater than 0"));

        check("int a[(int)2.5 * 4 / 2];").unwrap();
    }

    #[test]
    fn test_parameters_share_the_body_scope() {
        let err = check("void f(int a) { int a; }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateSymbol { ref name, .. } if name == "a"));

        check("void f(int a) { { double a; } }").unwrap();
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = check("void f(int a, char a) { }").unwrap_err();
        assert_eq!(err.location(), SourceLocation::new(1, 20));
    }

    #[test]
    fn test_user_function_cannot_redefine_builtin() {
        let err = check("void put_i(int x) { }").unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateSymbol { .. }));
    }

    #[test]
    fn test_validator_without_builtins() {
        let mut program = parse("void put_i(int x) { }");
        Validator::default().validate(&mut program).unwrap();
    }

    #[test]
    fn test_context_restored_after_error() {
        let mut program = parse("int f() { while (1) { return 1.5 + x; } }");
        let mut validator = Validator::with_builtins().unwrap();
        assert!(validator.validate(&mut program).is_err());
        assert!(validator.context().function().is_none());
        assert_eq!(validator.context().loop_depth(), 0);
        assert_eq!(validator.scope, validator.symbols().root());
    }
}
