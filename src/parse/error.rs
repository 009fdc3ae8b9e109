use super::lexer::TokenKind;
use crate::common::UInt;
use std::fmt;
use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Index of the offending token, or the token count at end of input.
    pub index: usize,
    pub span: Range<usize>,
    pub slice: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    UnexpectedEnd {
        expected: Vec<TokenKind>,
    },
    UnclosedParen {
        open: usize,
    },
    MissingSides,
    ZeroCount,
    ZeroSides,
    NumberTooLarge,
    TooManyDice {
        count: UInt,
        limit: UInt,
    },
    TooDeep {
        limit: usize,
    },
    UnknownFunction(String),
    InvalidParameter {
        function: String,
        value: UInt,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected ")?;
                fmt_expected(expected, f)
            }
            Self::UnclosedParen { open } => {
                write!(f, "'(' at position {} is never closed", open)
            }
            Self::MissingSides => write!(f, "dice expression is missing its number of sides"),
            Self::ZeroCount => write!(f, "cannot roll zero dice"),
            Self::ZeroSides => write!(f, "dice must have at least one side"),
            Self::NumberTooLarge => write!(f, "number is too large"),
            Self::TooManyDice { count, limit } => {
                write!(f, "cannot roll {} dice at once (the limit is {})", count, limit)
            }
            Self::TooDeep { limit } => {
                write!(f, "expression is nested too deeply (the limit is {})", limit)
            }
            Self::UnknownFunction(name) => {
                write!(f, "unknown function {:?}; expected one of {}", name, crate::Function::NAMES.join(", "))
            }
            Self::InvalidParameter { function, value } => {
                write!(f, "'{}' needs a positive count, found {}", function, value)
            }
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => Ok(()),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a, b),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp)?;
            }
            write!(f, "or {}", last)
        }
    }
}
