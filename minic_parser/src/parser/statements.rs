//! Statement parsing
//!
//! Top-level items admit function declarations and definitions; statements
//! inside bodies do not. Variable declarations are legal in both positions.

use crate::ast::{Param, Stmt, TypeName};
use crate::error::{ParseError, ParseResult};
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parse one top-level item: a typed item or a plain statement
    pub(crate) fn parse_item(&mut self) -> ParseResult<Stmt> {
        if self.check(Token::KwInt) || self.check(Token::KwVoid) {
            self.parse_typed_item(true)
        } else {
            self.parse_statement()
        }
    }

    /// Parse a statement inside a body
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current.as_ref().map(|t| t.token) {
            Some(Token::KwInt) | Some(Token::KwVoid) => self.parse_typed_item(false),
            Some(Token::KwPrint) => self.parse_print(),
            Some(Token::KwWhile) => self.parse_while(),
            Some(Token::KwIf) => self.parse_if(),
            Some(Token::KwFor) => self.parse_for(),
            Some(Token::KwDo) => self.parse_do_while(),
            Some(Token::KwReturn) => self.parse_return(),
            Some(Token::LBrace) => self.parse_block(),
            Some(Token::Identifier) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    /// Parse an item starting with a type name. In top-level position
    /// (`allow_functions`) this covers variable declarations, array
    /// declarations, function prototypes and function definitions.
    fn parse_typed_item(&mut self, allow_functions: bool) -> ParseResult<Stmt> {
        let start = self.current_span();
        let ty = self.parse_type_name()?;
        let (name, name_span) = self.expect_identifier("a name after the type")?;

        if self.check(Token::LParen) {
            if !allow_functions {
                return Err(ParseError::invalid_syntax(
                    "function definitions are only allowed at the top level",
                    name_span,
                ));
            }
            return self.parse_function_rest(ty, name, start);
        }

        if ty == TypeName::Void {
            return Err(ParseError::invalid_syntax(
                "'void' is only valid as a function return type",
                start,
            ));
        }

        if self.eat(Token::LBracket)? {
            let size_tok = self.expect(Token::Number)?;
            let size = size_tok
                .text
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidNumber {
                    literal: size_tok.text.to_string(),
                    span: size_tok.span,
                })?;
            self.expect(Token::RBracket)?;
            let end = self.expect(Token::Semicolon)?;
            return Ok(Stmt::ArrayDeclaration {
                name,
                size,
                span: start.merge(&end.span),
            });
        }

        let end = self.expect(Token::Semicolon)?;
        Ok(Stmt::Declaration {
            name,
            span: start.merge(&end.span),
        })
    }

    /// Parse the remainder of a function item after `type name`
    fn parse_function_rest(
        &mut self,
        return_type: TypeName,
        name: String,
        start: crate::span::Span,
    ) -> ParseResult<Stmt> {
        let params = self.parse_params()?;

        if self.check(Token::Semicolon) {
            let end = self.expect(Token::Semicolon)?;
            return Ok(Stmt::FunctionDecl {
                return_type,
                name,
                params,
                span: start.merge(&end.span),
            });
        }

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.check(Token::RBrace) {
            if self.current.is_none() {
                return Err(ParseError::unexpected_eof("'}'", self.eof_span()));
            }
            body.push(self.parse_statement()?);
        }
        let end = self.expect(Token::RBrace)?;

        Ok(Stmt::FunctionDef {
            return_type,
            name,
            params,
            body,
            span: start.merge(&end.span),
        })
    }

    /// Parse `( )`, `( void )`, or `( int a, int b, ... )`
    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(Token::LParen)?;

        let mut params = Vec::new();
        if self.eat(Token::RParen)? {
            return Ok(params);
        }
        if self.check(Token::KwVoid) && self.peek_next() == Some(Token::RParen) {
            self.advance()?;
            self.expect(Token::RParen)?;
            return Ok(params);
        }

        loop {
            let start = self.current_span();
            let ty = self.parse_type_name()?;
            let (name, name_span) = self.expect_identifier("a parameter name")?;
            params.push(Param {
                ty,
                name,
                span: start.merge(&name_span),
            });
            if !self.eat(Token::Comma)? {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    fn parse_type_name(&mut self) -> ParseResult<TypeName> {
        if self.eat(Token::KwInt)? {
            Ok(TypeName::Int)
        } else if self.eat(Token::KwVoid)? {
            Ok(TypeName::Void)
        } else {
            Err(self.unexpected("a type name"))
        }
    }

    fn parse_print(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwPrint)?;
        self.expect(Token::LParen)?;
        let value = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let end = self.expect(Token::Semicolon)?;
        Ok(Stmt::Print {
            value,
            span: start.merge(&end.span),
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwWhile)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_body()?;
        let span = body
            .last()
            .map(|s| start.merge(&s.span()))
            .unwrap_or(start);
        Ok(Stmt::While {
            condition,
            body,
            span,
        })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwIf)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.eat(Token::KwElse)? {
            Some(self.parse_body()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: start,
        })
    }

    /// `for (init; cond; step) body`. A trailing `;` after the step is
    /// accepted, so both `for (a; c; a)` and `for (a; c; a;)` parse.
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwFor)?;
        self.expect(Token::LParen)?;
        let init = self.parse_clause_assignment()?;
        self.expect(Token::Semicolon)?;
        let condition = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        let step = self.parse_clause_assignment()?;
        self.eat(Token::Semicolon)?;
        self.expect(Token::RParen)?;
        let body = self.parse_body()?;
        Ok(Stmt::For {
            init: Box::new(init),
            condition,
            step: Box::new(step),
            body,
            span: start,
        })
    }

    fn parse_do_while(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwDo)?;
        let body = self.parse_body()?;
        self.expect(Token::KwWhile)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let end = self.expect(Token::Semicolon)?;
        Ok(Stmt::DoWhile {
            body,
            condition,
            span: start.merge(&end.span),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::KwReturn)?;
        let value = if self.check(Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let end = self.expect(Token::Semicolon)?;
        Ok(Stmt::Return {
            value,
            span: start.merge(&end.span),
        })
    }

    fn parse_block(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(Token::RBrace) {
            if self.current.is_none() {
                return Err(ParseError::unexpected_eof("'}'", self.eof_span()));
            }
            stmts.push(self.parse_statement()?);
        }
        let end = self.expect(Token::RBrace)?;
        Ok(Stmt::Block {
            stmts,
            span: start.merge(&end.span),
        })
    }

    /// A body is either a braced statement sequence or a single statement
    fn parse_body(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(Token::LBrace) {
            match self.parse_block()? {
                Stmt::Block { stmts, .. } => Ok(stmts),
                _ => unreachable!("parse_block returns Stmt::Block"),
            }
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Statement starting with an identifier: assignment, array store or call
    fn parse_identifier_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_next() {
            Some(Token::Assign) | Some(Token::LBracket) => {
                let stmt = self.parse_clause_assignment()?;
                let end = self.expect(Token::Semicolon)?;
                Ok(match stmt {
                    Stmt::Assignment {
                        target,
                        value,
                        span,
                    } => Stmt::Assignment {
                        target,
                        value,
                        span: span.merge(&end.span),
                    },
                    Stmt::ArrayStore {
                        array,
                        index,
                        value,
                        span,
                    } => Stmt::ArrayStore {
                        array,
                        index,
                        value,
                        span: span.merge(&end.span),
                    },
                    other => other,
                })
            }
            Some(Token::LParen) => {
                let start = self.current_span();
                let (callee, _) = self.expect_identifier("a function name")?;
                let args = self.parse_args()?;
                let end = self.expect(Token::Semicolon)?;
                Ok(Stmt::Call {
                    callee,
                    args,
                    span: start.merge(&end.span),
                })
            }
            _ => {
                self.advance()?;
                Err(self.unexpected("'=', '[' or '(' after identifier"))
            }
        }
    }

    /// Assignment or array store without the trailing semicolon, as used in
    /// `for` clauses
    fn parse_clause_assignment(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        let (name, _) = self.expect_identifier("a variable name")?;

        if self.eat(Token::LBracket)? {
            let index = self.parse_expression()?;
            self.expect(Token::RBracket)?;
            self.expect(Token::Assign)?;
            let value = self.parse_expression()?;
            let span = start.merge(&value.span());
            return Ok(Stmt::ArrayStore {
                array: name,
                index,
                value,
                span,
            });
        }

        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        let span = start.merge(&value.span());
        Ok(Stmt::Assignment {
            target: name,
            value,
            span,
        })
    }
}
