use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RollError {
    #[error("cannot divide by zero: `{divisor}` evaluated to 0")]
    DivideByZero { divisor: String },
    #[error("integer overflow while evaluating `{expression}`")]
    Overflow { expression: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl RollError {
    pub(crate) fn internal(msg: impl ToString) -> Self {
        Self::Internal(msg.to_string())
    }

    pub(crate) fn overflow(expression: impl ToString) -> Self {
        Self::Overflow {
            expression: expression.to_string(),
        }
    }
}
