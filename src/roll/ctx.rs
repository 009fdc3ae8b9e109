use super::{
    error::RollError,
    pool::{self, Pool},
    record::{RollRecord, RollRecords},
    roller::Roller,
    RResult,
};
use crate::common::Int;
use crate::parse::{
    ast::{self, Expression},
    visit::{Accept, AstVisitor},
};

/// The outcome of evaluating an expression once.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Evaluation {
    pub value: Int,
    pub records: RollRecords,
}

/// Walks a tree left to right, drawing dice from the roller and recording every roll.
pub struct RollContext<'r, R: ?Sized> {
    roller: &'r mut R,
    records: RollRecords,
}

impl<'r, R: Roller + ?Sized> RollContext<'r, R> {
    pub fn new(roller: &'r mut R) -> Self {
        Self {
            roller,
            records: RollRecords::new(),
        }
    }

    pub fn eval(mut self, expr: &Expression) -> RResult<Evaluation> {
        let pool = expr.accept(&mut self)?;
        let value = pool::total(&pool, expr)?;
        Ok(Evaluation {
            value,
            records: self.records,
        })
    }
}

impl<R: Roller + ?Sized> AstVisitor for RollContext<'_, R> {
    type Output = RResult<Pool>;

    fn visit_literal(&mut self, x: &ast::Literal) -> Self::Output {
        Ok(Pool::single(x.value))
    }

    fn visit_dice(&mut self, dice: &ast::DiceRoll) -> Self::Output {
        let results = self.roller.roll_n(dice.count.get() as usize, dice.sides);
        tracing::trace!(node = %dice.id, %dice, ?results, "rolled");

        let record = RollRecord::new(dice.count, dice.sides, results);
        let pool = Pool::from(&record);
        if self.records.insert(dice.id, record).is_some() {
            return Err(RollError::internal(format!(
                "dice node {} ({}) was rolled twice",
                dice.id, dice
            )));
        }
        Ok(pool)
    }

    fn visit_binary(&mut self, bin: &ast::BinaryOp) -> Self::Output {
        let left = self.visit(&*bin.left)?;
        let right = self.visit(&*bin.right)?;
        pool::binary(bin, &left, &right)
    }

    fn visit_call(&mut self, call: &ast::FunctionCall) -> Self::Output {
        let args = call
            .args
            .iter()
            .map(|node| self.visit(node))
            .collect::<RResult<Vec<_>>>()?;
        pool::call(call, args)
    }
}
