//! Recursive descent parser for MiniC
//!
//! Converts the token stream from the lexer into the AST. The grammar is
//! LL(1) except for statements beginning with an identifier, which need one
//! extra token of lookahead to distinguish assignment, array store and call.

mod expressions;
mod statements;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// MiniC parser
pub struct Parser<'a> {
    /// Source code
    pub(crate) source: &'a str,
    /// Lexer
    pub(crate) lexer: Lexer<'a>,
    /// Current token (one-token window)
    pub(crate) current: Option<SpannedToken<'a>>,
}

/// Parse a complete source file into a [`Program`]
pub fn parse(source: &str) -> ParseResult<Program> {
    Parser::new(source).parse_program()
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let lexer = Lexer::new(source);
        Self {
            source,
            lexer,
            current: None,
        }
    }

    /// Parse the token stream into the top-level statement sequence
    pub fn parse_program(mut self) -> ParseResult<Program> {
        self.advance()?;

        let mut items = Vec::new();
        while self.current.is_some() {
            items.push(self.parse_item()?);
        }

        let map = SourceMap::new(self.source);
        let span = map.span(0, self.source.len());
        Ok(Program::new(items, span))
    }

    // ==================== Token management ====================

    /// Advance to the next token, returning the previous one
    pub(crate) fn advance(&mut self) -> ParseResult<Option<SpannedToken<'a>>> {
        let prev = self.current.take();
        self.current = match self.lexer.next_token() {
            Some(Ok(token)) => Some(token),
            Some(Err(e)) => return Err(e),
            None => None,
        };
        Ok(prev)
    }

    /// Check whether the current token matches
    pub(crate) fn check(&self, expected: Token) -> bool {
        self.current
            .as_ref()
            .map(|t| t.token == expected)
            .unwrap_or(false)
    }

    /// Peek one token past the current one
    pub(crate) fn peek_next(&mut self) -> Option<Token> {
        match self.lexer.peek() {
            Some(Ok(token)) => Some(token.token),
            _ => None,
        }
    }

    /// Consume the current token if it matches
    pub(crate) fn eat(&mut self, expected: Token) -> ParseResult<bool> {
        if self.check(expected) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token, failing if it does not match
    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        match self.current.take() {
            Some(tok) if tok.token == expected => {
                self.advance()?;
                Ok(tok)
            }
            Some(tok) => {
                let err = ParseError::unexpected_token(
                    format!("'{}'", tok.text),
                    expected.describe(),
                    tok.span,
                );
                self.current = Some(tok);
                Err(err)
            }
            None => Err(ParseError::unexpected_eof(
                expected.describe(),
                self.eof_span(),
            )),
        }
    }

    /// Consume an identifier and return its text and span
    pub(crate) fn expect_identifier(&mut self, context: &str) -> ParseResult<(String, Span)> {
        match self.current.take() {
            Some(tok) if tok.token == Token::Identifier => {
                let name = tok.text.to_string();
                let span = tok.span;
                self.advance()?;
                Ok((name, span))
            }
            Some(tok) => {
                let err = ParseError::unexpected_token(format!("'{}'", tok.text), context, tok.span);
                self.current = Some(tok);
                Err(err)
            }
            None => Err(ParseError::unexpected_eof(context, self.eof_span())),
        }
    }

    /// Span pointing at the end of input
    pub(crate) fn eof_span(&self) -> Span {
        self.lexer.source_map().span(self.source.len(), self.source.len())
    }

    /// Span of the current token, or end of input
    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.eof_span())
    }

    /// Error for an unexpected current token in the given context
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        match &self.current {
            Some(tok) => {
                ParseError::unexpected_token(format!("'{}'", tok.text), expected, tok.span)
            }
            None => ParseError::unexpected_eof(expected, self.eof_span()),
        }
    }
}
