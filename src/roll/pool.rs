use super::{error::RollError, record::RollRecord, RResult};
use crate::common::*;
use crate::parse::ast::{BinaryOp, FunctionCall};
use std::fmt;

/// The values a node hands to its parent. A node's value is the sum of its pool.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Pool(Vec<Int>);

impl Pool {
    pub fn single(value: Int) -> Self {
        Self(vec![value])
    }

    pub fn values(&self) -> &[Int] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of the pool, `None` on overflow.
    pub fn total(&self) -> Option<Int> {
        self.0.iter().try_fold(0 as Int, |acc, &x| acc.checked_add(x))
    }

    fn concat(pools: impl IntoIterator<Item = Pool>) -> Self {
        Self(pools.into_iter().flat_map(|p| p.0).collect())
    }

    fn sorted(mut self) -> Vec<Int> {
        self.0.sort_unstable();
        self.0
    }

    /// Applies a function to the pool, `None` on overflow.
    pub fn apply(self, function: Function) -> Option<Self> {
        let values = match function {
            Function::Max => self.0.iter().copied().max().into_iter().collect(),
            Function::Min => self.0.iter().copied().min().into_iter().collect(),
            Function::Sum => vec![self.total()?],
            Function::Top(n) => {
                let mut sorted = self.sorted();
                let skip = sorted.len().saturating_sub(n.get() as usize);
                sorted.split_off(skip)
            }
            Function::Bottom(n) => {
                let mut sorted = self.sorted();
                sorted.truncate(n.get() as usize);
                sorted
            }
            Function::Count(target) => {
                let count = self.0.iter().filter(|&&x| x == target).count();
                vec![Int::try_from(count).ok()?]
            }
        };
        Some(Self(values))
    }
}

impl From<&RollRecord> for Pool {
    fn from(record: &RollRecord) -> Self {
        Self(record.results.iter().map(|&x| Int::from(x)).collect())
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        f.write_str(&values.join(", "))
    }
}

pub(crate) fn total(pool: &Pool, node: &impl fmt::Display) -> RResult<Int> {
    pool.total().ok_or_else(|| RollError::overflow(node))
}

/// Combines the totals of both operands.
pub(crate) fn binary(node: &BinaryOp, left: &Pool, right: &Pool) -> RResult<Pool> {
    let l = total(left, &node.left)?;
    let r = total(right, &node.right)?;

    if node.op == BinaryOperator::Div && r == 0 {
        return Err(RollError::DivideByZero {
            divisor: node.right.to_string(),
        });
    }

    node.op
        .apply(l, r)
        .map(Pool::single)
        .ok_or_else(|| RollError::overflow(node))
}

/// Pools the arguments in order and applies the function.
pub(crate) fn call(node: &FunctionCall, args: Vec<Pool>) -> RResult<Pool> {
    Pool::concat(args)
        .apply(node.function)
        .ok_or_else(|| RollError::overflow(node))
}
