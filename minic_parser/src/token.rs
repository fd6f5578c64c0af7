//! Token definitions for the MiniC lexer

use logos::Logos;

/// MiniC tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // ==================== Keywords ====================
    #[token("int")]
    KwInt,
    #[token("void")]
    KwVoid,
    #[token("print")]
    KwPrint,
    #[token("while")]
    KwWhile,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("for")]
    KwFor,
    #[token("do")]
    KwDo,
    #[token("return")]
    KwReturn,

    // ==================== Literals and names ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Number,

    // ==================== Operators ====================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Assign,

    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // ==================== Punctuation ====================
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,

    // ==================== Comments ====================
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*")]
    BlockCommentStart,
}

impl Token {
    /// Human readable token name for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Token::KwInt => "'int'",
            Token::KwVoid => "'void'",
            Token::KwPrint => "'print'",
            Token::KwWhile => "'while'",
            Token::KwIf => "'if'",
            Token::KwElse => "'else'",
            Token::KwFor => "'for'",
            Token::KwDo => "'do'",
            Token::KwReturn => "'return'",
            Token::Identifier => "identifier",
            Token::Number => "number",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Star => "'*'",
            Token::Slash => "'/'",
            Token::Percent => "'%'",
            Token::LessEqual => "'<='",
            Token::GreaterEqual => "'>='",
            Token::EqualEqual => "'=='",
            Token::NotEqual => "'!='",
            Token::Less => "'<'",
            Token::Greater => "'>'",
            Token::Assign => "'='",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrace => "'{'",
            Token::RBrace => "'}'",
            Token::LBracket => "'['",
            Token::RBracket => "']'",
            Token::Semicolon => "';'",
            Token::Comma => "','",
            Token::LineComment => "comment",
            Token::BlockCommentStart => "comment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex_all(src: &str) -> Vec<Token> {
        Token::lexer(src).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(
            lex_all("int while whilex"),
            vec![Token::KwInt, Token::KwWhile, Token::Identifier]
        );
    }

    #[test]
    fn two_char_operators_win_over_one_char() {
        assert_eq!(
            lex_all("<= >= == != < > ="),
            vec![
                Token::LessEqual,
                Token::GreaterEqual,
                Token::EqualEqual,
                Token::NotEqual,
                Token::Less,
                Token::Greater,
                Token::Assign,
            ]
        );
    }

    #[test]
    fn line_comment_is_a_single_token() {
        assert_eq!(
            lex_all("x = 1; // trailing note"),
            vec![
                Token::Identifier,
                Token::Assign,
                Token::Number,
                Token::Semicolon,
                Token::LineComment,
            ]
        );
    }

    #[test]
    fn unknown_character_is_a_lex_error() {
        let mut lexer = Token::lexer("x @ y");
        assert_eq!(lexer.next(), Some(Ok(Token::Identifier)));
        assert_eq!(lexer.next(), Some(Err(())));
    }
}
