use logos::Logos;
use std::fmt;
use std::ops::Range;

use crate::common::BinaryOperator;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,

    #[token("d")]
    #[token("D")]
    Dice,

    #[regex(r"[a-zA-Z]+")]
    Identifier,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Dice => "'d'",
            Identifier => "<function>",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Error => "<error>",
        }
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical unit of the input, borrowing its text from the source line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub slice: &'a str,
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[error("unrecognized character {character:?} at position {position}")]
pub struct LexError {
    pub character: char,
    /// Byte offset of the character in the input.
    pub position: usize,
}

/// Splits a line of dice notation into tokens.
///
/// # Errors
/// Returns [`LexError`] at the first character that starts no token.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        if kind == TokenKind::Error {
            let character = input
                .get(span.start..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(LexError {
                character,
                position: span.start,
            });
        }
        tokens.push(Token {
            kind,
            slice: lexer.slice(),
            span,
        });
    }

    tracing::trace!(input, tokens = tokens.len(), "tokenized");
    Ok(tokens)
}
