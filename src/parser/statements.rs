//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! stm         ::= stmCompound
//!               | "if" "(" expr ")" stm ( "else" stm )?
//!               | "while" "(" expr ")" stm
//!               | "for" "(" expr? ";" expr? ";" expr? ")" stm
//!               | "break" ";"
//!               | "return" expr? ";"
//!               | expr? ";"
//! stmCompound ::= "{" ( varDecl | stm )* "}"
//! ```
//!
//! Every statement keyword is a commit point: once it is consumed, the rest of
//! the production is required.

use crate::parser::ast::*;
use crate::parser::parse::{Committed, PResult, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a statement
    pub(crate) fn stm(&mut self) -> PResult<Stmt> {
        self.nested(|p| {
            p.choice(&[
                Self::stm_block,
                Self::stm_if,
                Self::stm_while,
                Self::stm_for,
                Self::stm_break,
                Self::stm_return,
                Self::stm_expression,
            ])
        })
    }

    /// Parse compound statement: { (declaration | statement)* }
    pub(crate) fn stm_compound(&mut self) -> PResult<Block> {
        let location = self.consume(TokenKind::LAcc, "'{'")?.location;

        let items = self
            .many(Self::block_items, false)?
            .into_iter()
            .flatten()
            .collect();

        self.consume(TokenKind::RAcc, "'}' after block").cut()?;
        Ok(Block { items, location })
    }

    fn block_items(&mut self) -> PResult<Vec<BlockItem>> {
        self.choice(&[
            |p: &mut Parser| {
                Ok(p.var_decl()?
                    .into_iter()
                    .map(BlockItem::Declaration)
                    .collect())
            },
            |p: &mut Parser| Ok(vec![BlockItem::Statement(p.stm()?)]),
        ])
    }

    fn stm_block(&mut self) -> PResult<Stmt> {
        Ok(Stmt::Block(self.stm_compound()?))
    }

    fn stm_if(&mut self) -> PResult<Stmt> {
        let location = self.consume(TokenKind::If, "'if'")?.location;
        self.consume(TokenKind::LPar, "'(' after 'if'").cut()?;
        let condition = self.expr().cut()?;
        self.consume(TokenKind::RPar, "')' after if condition").cut()?;
        let then_branch = Box::new(self.stm().cut()?);

        let else_branch = self
            .optional(|p| {
                p.consume(TokenKind::Else, "'else'")?;
                p.stm().cut()
            })?
            .map(Box::new);

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn stm_while(&mut self) -> PResult<Stmt> {
        let location = self.consume(TokenKind::While, "'while'")?.location;
        self.consume(TokenKind::LPar, "'(' after 'while'").cut()?;
        let condition = self.expr().cut()?;
        self.consume(TokenKind::RPar, "')' after while condition").cut()?;
        let body = Box::new(self.stm().cut()?);

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    fn stm_for(&mut self) -> PResult<Stmt> {
        let location = self.consume(TokenKind::For, "'for'")?.location;
        self.consume(TokenKind::LPar, "'(' after 'for'").cut()?;
        let init = self.optional(Self::expr)?;
        self.consume(TokenKind::Semicolon, "';' after for initializer").cut()?;
        let condition = self.optional(Self::expr)?;
        self.consume(TokenKind::Semicolon, "';' after for condition").cut()?;
        let increment = self.optional(Self::expr)?;
        self.consume(TokenKind::RPar, "')' after for clauses").cut()?;
        let body = Box::new(self.stm().cut()?);

        Ok(Stmt::For {
            init,
            condition,
            increment,
            body,
            location,
        })
    }

    fn stm_break(&mut self) -> PResult<Stmt> {
        let location = self.consume(TokenKind::Break, "'break'")?.location;
        self.consume(TokenKind::Semicolon, "';' after 'break'").cut()?;
        Ok(Stmt::Break { location })
    }

    fn stm_return(&mut self) -> PResult<Stmt> {
        let location = self.consume(TokenKind::Return, "'return'")?.location;
        let expr = self.optional(Self::expr)?;
        self.consume(TokenKind::Semicolon, "';' after return").cut()?;
        Ok(Stmt::Return { expr, location })
    }

    /// `expr? ;` — only a present expression commits to the semicolon, so a
    /// closing brace still ends the enclosing block.
    fn stm_expression(&mut self) -> PResult<Stmt> {
        let location = self.current_location();
        let expr = self.optional(Self::expr)?;
        let semicolon = self.consume(TokenKind::Semicolon, "';' after expression");
        if expr.is_some() {
            semicolon.cut()?;
        } else {
            semicolon?;
        }
        Ok(Stmt::Expression { expr, location })
    }
}
