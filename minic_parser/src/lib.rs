//! Front end for the MiniC compiler
//!
//! Tokenizes and parses MiniC source into the syntax tree consumed by the
//! back-end phases (semantic analysis, TAC generation, code emission).

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{BinOp, Expr, Param, Program, RelOp, Stmt, TypeName};
pub use error::{ParseError, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use parser::{parse, Parser};
pub use span::{SourceMap, Span};
pub use token::Token;
