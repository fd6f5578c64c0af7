//! Expression parsing
//!
//! Precedence, loosest first: relational (non-associative), additive,
//! multiplicative, primary. Relational operators may appear at most once per
//! expression.

use crate::ast::{BinOp, Expr, RelOp};
use crate::error::{ParseError, ParseResult};
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive()?;

        let op = match self.current.as_ref().map(|t| t.token) {
            Some(Token::Less) => RelOp::Lt,
            Some(Token::Greater) => RelOp::Gt,
            Some(Token::LessEqual) => RelOp::Le,
            Some(Token::GreaterEqual) => RelOp::Ge,
            Some(Token::EqualEqual) => RelOp::Eq,
            Some(Token::NotEqual) => RelOp::Ne,
            _ => return Ok(left),
        };
        self.advance()?;

        let right = self.parse_additive()?;
        let span = left.span().merge(&right.span());
        Ok(Expr::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current.as_ref().map(|t| t.token) {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            let span = left.span().merge(&right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_primary()?;

        loop {
            let op = match self.current.as_ref().map(|t| t.token) {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_primary()?;
            let span = left.span().merge(&right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current.as_ref().map(|t| t.token) {
            Some(Token::Number) => {
                let tok = self.expect(Token::Number)?;
                let value = tok
                    .text
                    .parse::<i64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        literal: tok.text.to_string(),
                        span: tok.span,
                    })?;
                Ok(Expr::Number {
                    value,
                    span: tok.span,
                })
            }
            Some(Token::LParen) => {
                self.expect(Token::LParen)?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Identifier) => self.parse_identifier_expression(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Identifier-led expression: variable, array access or call
    fn parse_identifier_expression(&mut self) -> ParseResult<Expr> {
        let (name, span) = self.expect_identifier("a name")?;

        if self.check(Token::LBracket) {
            self.expect(Token::LBracket)?;
            let index = self.parse_expression()?;
            let end = self.expect(Token::RBracket)?;
            return Ok(Expr::ArrayAccess {
                array: name,
                index: Box::new(index),
                span: span.merge(&end.span),
            });
        }

        if self.check(Token::LParen) {
            let args = self.parse_args()?;
            let end_span = args.last().map(|a| a.span()).unwrap_or(span);
            return Ok(Expr::Call {
                callee: name,
                args,
                span: span.merge(&end_span),
            });
        }

        Ok(Expr::Identifier { name, span })
    }

    /// Parse a parenthesized argument list
    pub(crate) fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.eat(Token::RParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(Token::Comma)? {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}
