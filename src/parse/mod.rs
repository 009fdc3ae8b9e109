pub mod ast;
mod error;
mod lexer;
mod parser;
pub mod visit;

pub use ast::{Expression, NodeId};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{tokenize, LexError, Token, TokenKind};

use crate::config::Config;

/// Builds an expression tree from tokens using the default [`Config`].
///
/// # Errors
/// Returns [`ParseError`] if the tokens are not a well-formed dice expression.
pub fn parse(tokens: &[Token<'_>]) -> Result<Expression, ParseError> {
    parse_with(tokens, &Config::default())
}

/// Builds an expression tree from tokens, enforcing the limits in `config`.
///
/// # Errors
/// Returns [`ParseError`] if the tokens are not a well-formed dice expression
/// or a dice term exceeds [`Config::max_dice`].
pub fn parse_with(tokens: &[Token<'_>], config: &Config) -> Result<Expression, ParseError> {
    let expr = parser::Parser::new(tokens, *config).parse()?;
    tracing::debug!(tokens = tokens.len(), dice = expr.dice_count(), expression = %expr, "parsed");
    Ok(expr)
}
