use crate::parse::{LexError, ParseError};
use crate::roll::RollError;

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Roll(#[from] RollError),
}

impl Error {
    /// Byte offset in the input line that the error points at, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex(e) => Some(e.position),
            Self::Parse(e) => Some(e.span.start),
            Self::Roll(_) => None,
        }
    }
}
