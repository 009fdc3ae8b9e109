mod ctx;
mod error;
mod pool;
mod record;
mod roller;
mod stringify;

use crate::parse::Expression;

type RResult<T> = Result<T, RollError>;

pub use ctx::{Evaluation, RollContext};
pub use error::RollError;
pub use pool::Pool;
pub use record::{RollRecord, RollRecords};
pub use roller::Roller;
pub use stringify::{format_trace, AnsiStringifier, PlainStringifier, Stringify, ValueKind};

#[cfg(test)]
pub(crate) use roller::{FixedRoller, ScriptedRoller};

/// Evaluates an expression, drawing every die from `roller` in left-to-right order.
///
/// # Errors
/// Returns [`RollError::DivideByZero`] when a divisor evaluates to zero and
/// [`RollError::Overflow`] when an intermediate value does not fit in an `i64`.
#[tracing::instrument(level = "debug", skip_all, fields(expression = %expr))]
pub fn evaluate<R: Roller + ?Sized>(expr: &Expression, roller: &mut R) -> RResult<Evaluation> {
    let evaluation = RollContext::new(roller).eval(expr)?;
    tracing::debug!(value = evaluation.value, dice = evaluation.records.len(), "evaluated");
    Ok(evaluation)
}
