use std::fmt::{self, Write};
use std::num::NonZeroU32;
pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// The word used for this operator in roll traces.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "subtract",
            Self::Mul => "multiply",
            Self::Div => "divide",
        }
    }

    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    /// Applies the operator, returning `None` on overflow or a zero divisor.
    ///
    /// Division truncates toward zero.
    pub fn apply(&self, l: Int, r: Int) -> Option<Int> {
        match self {
            Self::Add => l.checked_add(r),
            Self::Sub => l.checked_sub(r),
            Self::Mul => l.checked_mul(r),
            Self::Div => l.checked_div(r),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        };
        f.write_char(c)
    }
}

/// A function that can be applied to the pooled values of its arguments.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Function {
    Max,
    Min,
    Sum,
    /// Keeps the `n` highest values.
    Top(NonZeroUInt),
    /// Keeps the `n` lowest values.
    Bottom(NonZeroUInt),
    /// Counts the values equal to the target.
    Count(Int),
}

impl Function {
    pub const NAMES: &'static [&'static str] = &["max", "min", "sum", "top", "bottom", "count"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Top(_) => "top",
            Self::Bottom(_) => "bottom",
            Self::Count(_) => "count",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top(n) | Self::Bottom(n) => write!(f, "{} {}", self.name(), n),
            Self::Count(target) => write!(f, "{} {}", self.name(), target),
            _ => f.write_str(self.name()),
        }
    }
}
