//! Declaration parsing implementation
//!
//! This module handles the top-level productions and the type syntax:
//!
//! - Struct declarations: `struct Name { members };`
//! - Function declarations: `type name(params) { ... }`
//! - Variable declarations: `type a, b[3];`
//!
//! # Grammar
//!
//! ```text
//! unit       ::= ( structDecl | funcDecl | varDecl )* END
//! structDecl ::= "struct" ID "{" varDecl* "}" ";"
//! varDecl    ::= typeBase ID arrayDecl? ( "," ID arrayDecl? )* ";"
//! typeBase   ::= "int" | "double" | "char" | "struct" ID
//! arrayDecl  ::= "[" expr? "]"
//! typeName   ::= typeBase arrayDecl?
//! funcDecl   ::= ( typeBase "*"? | "void" ) ID "(" ( funcArg ( "," funcArg )* )? ")" stmCompound
//! funcArg    ::= typeBase ID arrayDecl?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Committed, Failure, PResult, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a whole translation unit. A top-level construct that matches no
    /// declaration form is fatal.
    pub(crate) fn unit(&mut self) -> PResult<Program> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let declarations = self
                .choice(&[Self::struct_item, Self::function_item, Self::variable_items])
                .cut()?;
            program.declarations.extend(declarations);
        }

        self.consume(TokenKind::End, "end of input").cut()?;
        Ok(program)
    }

    fn struct_item(&mut self) -> PResult<Vec<Declaration>> {
        Ok(vec![Declaration::Struct(self.struct_decl()?)])
    }

    fn function_item(&mut self) -> PResult<Vec<Declaration>> {
        Ok(vec![Declaration::Function(self.func_decl()?)])
    }

    fn variable_items(&mut self) -> PResult<Vec<Declaration>> {
        Ok(self
            .var_decl()?
            .into_iter()
            .map(Declaration::Variable)
            .collect())
    }

    /// Parse struct declaration: struct Name { members };
    pub(crate) fn struct_decl(&mut self) -> PResult<StructDecl> {
        self.consume(TokenKind::Struct, "'struct'")?;
        let (name, location) = self.identifier("struct name")?;
        // Without the brace this is a variable or function of struct type.
        self.consume(TokenKind::LAcc, "'{' after struct name")?;

        let members = self
            .many(Self::var_decl, false)?
            .into_iter()
            .flatten()
            .collect();

        self.consume(TokenKind::RAcc, "'}' after struct members").cut()?;
        self.consume(TokenKind::Semicolon, "';' after struct declaration")
            .cut()?;

        Ok(StructDecl {
            name,
            members,
            location,
        })
    }

    /// Parse variable declaration list: type a, b[N];
    pub(crate) fn var_decl(&mut self) -> PResult<Vec<VarDecl>> {
        let base = self.type_base()?;
        let (name, location) = self.identifier("variable name")?;

        let mut decls = vec![self.declarator(&base, name, location).cut()?];
        let rest = self
            .many(
                |p| {
                    p.consume(TokenKind::Comma, "','")?;
                    let (name, location) = p.identifier("variable name").cut()?;
                    p.declarator(&base, name, location).cut()
                },
                false,
            )
            .cut()?;
        decls.extend(rest);

        self.consume(TokenKind::Semicolon, "';' after variable declaration")
            .cut()?;
        Ok(decls)
    }

    /// The optional array suffix after a declared name.
    fn declarator(&mut self, base: &Type, name: String, location: SourceLocation) -> PResult<VarDecl> {
        let var_type = match self.optional(Self::array_decl)? {
            Some(size) => base.clone().with_array(size),
            None => base.clone(),
        };
        Ok(VarDecl {
            name,
            var_type,
            location,
        })
    }

    /// Parse base type: int | double | char | struct Name
    pub(crate) fn type_base(&mut self) -> PResult<Type> {
        let ty = match self.peek().kind {
            TokenKind::Int => Type::int(),
            TokenKind::Double => Type::float(),
            TokenKind::Char => Type::char(),
            TokenKind::Struct => {
                self.advance();
                let (name, _) = self.identifier("struct name").cut()?;
                return Ok(Type::structure(name));
            }
            _ => return Err(Failure::Soft(self.unexpected("type name"))),
        };
        self.advance();
        Ok(ty)
    }

    /// Parse array declarator: [ size? ]
    pub(crate) fn array_decl(&mut self) -> PResult<Option<Expr>> {
        self.consume(TokenKind::LBracket, "'['")?;
        let size = self.optional(Self::expr)?;
        self.consume(TokenKind::RBracket, "']' after array size").cut()?;
        Ok(size)
    }

    /// Parse type name (as used in casts): base type with optional array suffix
    pub(crate) fn type_name(&mut self) -> PResult<Type> {
        let base = self.type_base()?;
        Ok(match self.optional(Self::array_decl)? {
            Some(size) => base.with_array(size),
            None => base,
        })
    }

    /// `typeBase '*'?` or `void`; the star declares an unsized array result.
    fn return_type(&mut self) -> PResult<Type> {
        self.choice(&[
            |p: &mut Parser| {
                let base = p.type_base()?;
                let star = p.optional(|p| p.consume(TokenKind::Mul, "'*'"))?;
                Ok(match star {
                    Some(_) => base.with_array(None),
                    None => base,
                })
            },
            |p: &mut Parser| p.consume(TokenKind::Void, "'void'").map(|_| Type::void()),
        ])
    }

    /// Parse function declaration: type name(params) { body }
    pub(crate) fn func_decl(&mut self) -> PResult<FunctionDecl> {
        let return_type = self.return_type()?;
        let (name, location) = self.identifier("function name")?;
        self.consume(TokenKind::LPar, "'(' after function name")?;

        let mut params = Vec::new();
        if let Some(first) = self.optional(Self::func_arg).cut()? {
            params.push(first);
            let rest = self
                .many(
                    |p| {
                        p.consume(TokenKind::Comma, "','")?;
                        p.func_arg().cut()
                    },
                    false,
                )
                .cut()?;
            params.extend(rest);
        }

        self.consume(TokenKind::RPar, "')' after parameters").cut()?;
        let body = self.stm_compound().cut()?;

        Ok(FunctionDecl {
            name,
            return_type,
            params,
            body,
            location,
        })
    }

    /// Parse one parameter: type name [ size? ]?
    pub(crate) fn func_arg(&mut self) -> PResult<VarDecl> {
        let base = self.type_base()?;
        let (name, location) = self.identifier("parameter name")?;
        self.declarator(&base, name, location)
    }
}
