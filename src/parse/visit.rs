use super::ast::*;

pub trait AstVisitor {
    type Output;

    fn visit<A: Accept + ?Sized>(&mut self, node: &A) -> Self::Output {
        node.accept(self)
    }

    fn visit_literal(&mut self, x: &Literal) -> Self::Output;

    fn visit_dice(&mut self, x: &DiceRoll) -> Self::Output;

    fn visit_binary(&mut self, x: &BinaryOp) -> Self::Output;

    fn visit_call(&mut self, x: &FunctionCall) -> Self::Output;
}

#[enum_dispatch::enum_dispatch]
pub trait Accept {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output;
}

impl Accept for Expression {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        self.root.accept(v)
    }
}

impl Accept for Literal {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        v.visit_literal(self)
    }
}

impl Accept for DiceRoll {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        v.visit_dice(self)
    }
}

impl Accept for BinaryOp {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        v.visit_binary(self)
    }
}

impl Accept for FunctionCall {
    fn accept<V: AstVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        v.visit_call(self)
    }
}
