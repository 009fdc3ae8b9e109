//! Dice notation: tokenize, parse and roll expressions like `3d6 + 2` or
//! `max 2d20, 1d8`, and explain how a roll came out.
//!
//! ```
//! use dice_roller::{roll, format_trace};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let (expr, eval) = roll("4d6 + 1", &mut rng).unwrap();
//! assert!((5..=25).contains(&eval.value));
//! println!("{}", format_trace(&expr, &eval.records).unwrap());
//! ```

mod common;
pub mod config;
mod error;
pub mod parse;
pub mod roll;
pub mod session;

pub use common::{BinaryOperator, Function, Int, NonEmpty, NonZeroUInt, UInt};
pub use config::{Config, DEFAULT_MAX_DEPTH, DEFAULT_MAX_DICE};
pub use error::Error;
pub use parse::{parse, parse_with, tokenize, Expression, LexError, NodeId, ParseError, ParseErrorKind, Token, TokenKind};
pub use roll::{
    evaluate, format_trace, AnsiStringifier, Evaluation, PlainStringifier, RollError, RollRecord, RollRecords, Roller,
    Stringify,
};
pub use session::{Command, Interpreter, LastRoll, Reply, RollSession, NO_ROLL_YET};

/// Tokenizes, parses and evaluates `input` in one go.
///
/// # Errors
/// Returns the first lex, parse or evaluation error.
pub fn roll<R: Roller + ?Sized>(input: &str, roller: &mut R) -> Result<(Expression, Evaluation), Error> {
    let tokens = tokenize(input)?;
    let expr = parse(&tokens)?;
    let eval = evaluate(&expr, roller)?;
    Ok((expr, eval))
}
