//! Parse error types

use crate::span::Span;
use thiserror::Error;

/// Parse error type
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    /// Unexpected token
    #[error("line {}: unexpected {found}, expected {expected}", .span.line())]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// Unexpected end of input
    #[error("line {}: unexpected end of input, expected {expected}", .span.line())]
    UnexpectedEof { expected: String, span: Span },

    /// Invalid number literal (out of range)
    #[error("line {}: invalid number literal '{literal}'", .span.line())]
    InvalidNumber { literal: String, span: Span },

    /// Unterminated block comment
    #[error("line {}: unterminated block comment", .span.line())]
    UnterminatedBlockComment { span: Span },

    /// Invalid syntax with a free-form message
    #[error("line {}: {message}", .span.line())]
    InvalidSyntax { message: String, span: Span },

    /// Lexer error
    #[error("line {}: unrecognized character", .span.line())]
    LexerError { span: Span },
}

impl ParseError {
    /// Get the span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => span,
            ParseError::UnexpectedEof { span, .. } => span,
            ParseError::InvalidNumber { span, .. } => span,
            ParseError::UnterminatedBlockComment { span } => span,
            ParseError::InvalidSyntax { span, .. } => span,
            ParseError::LexerError { span } => span,
        }
    }

    /// The 1-indexed line the error points at
    pub fn line(&self) -> usize {
        self.span().line()
    }

    /// Create an unexpected token error
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
