//! Lexer for MiniC source code
//!
//! Wraps the logos-generated lexer with block comment handling, span
//! construction and one-token lookahead.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// MiniC lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    /// Peeked token (for lookahead)
    peeked: Option<ParseResult<SpannedToken<'a>>>,
    /// Offset from original source (used after restarting the inner lexer)
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let source_map = SourceMap::new(source);
        Self {
            source,
            inner: Token::lexer(source),
            source_map,
            peeked: None,
            offset: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&ParseResult<SpannedToken<'a>>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<ParseResult<SpannedToken<'a>>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    /// Internal method to get the next token. Comments are consumed here so
    /// the parser never sees them.
    fn next_token_internal(&mut self) -> Option<ParseResult<SpannedToken<'a>>> {
        loop {
            let result = self.inner.next()?;
            let span = self.inner.span();
            let start = self.offset + span.start;
            let end = self.offset + span.end;

            match result {
                Ok(Token::LineComment) => continue,
                Ok(Token::BlockCommentStart) => {
                    // Scan for the closing `*/`; C-style comments do not nest.
                    match self.scan_block_comment(end) {
                        Ok(comment_end) => {
                            self.restart_from(comment_end);
                            continue;
                        }
                        Err(e) => {
                            // Restart at end of source to prevent further tokens
                            self.restart_from(self.source.len());
                            return Some(Err(e));
                        }
                    }
                }
                Ok(token) => {
                    let span = self.make_span(start, end);
                    let text = &self.source[start..end];
                    return Some(Ok(SpannedToken::new(token, span, text)));
                }
                Err(()) => {
                    return Some(Err(ParseError::LexerError {
                        span: self.make_span(start, end),
                    }));
                }
            }
        }
    }

    /// Scan from `start` (just past `/*`) to the byte after the closing `*/`.
    /// Uses memchr to jump to candidate `*` positions.
    fn scan_block_comment(&self, start: usize) -> Result<usize, ParseError> {
        let bytes = self.source.as_bytes();
        let mut pos = start;

        while pos < bytes.len() {
            match memchr::memchr(b'*', &bytes[pos..]) {
                Some(found) => {
                    let star = pos + found;
                    if star + 1 < bytes.len() && bytes[star + 1] == b'/' {
                        return Ok(star + 2);
                    }
                    pos = star + 1;
                }
                None => break,
            }
        }

        Err(ParseError::UnterminatedBlockComment {
            span: self.make_span(start.saturating_sub(2), self.source.len()),
        })
    }

    /// Restart the inner lexer from an absolute byte position
    fn restart_from(&mut self, position: usize) {
        self.offset = position;
        self.inner = Token::lexer(&self.source[position..]);
    }
}
