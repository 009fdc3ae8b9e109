use crate::common::*;
use std::fmt;

/// A parsed dice expression, owning the root of its tree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Expression {
    pub(crate) root: Node,
    pub(crate) dice: usize,
}

impl Expression {
    pub(crate) fn new(root: Node, dice: usize) -> Self {
        Self { root, dice }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of dice-roll nodes in the tree.
    pub fn dice_count(&self) -> usize {
        self.dice
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Identifies a dice-roll node within one tree. Assigned in source order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[enum_dispatch::enum_dispatch(Accept)]
pub enum Node {
    Literal(Literal),
    Dice(DiceRoll),
    Binary(BinaryOp),
    Call(FunctionCall),
}

impl Node {
    pub fn literal(value: Int) -> Self {
        Self::Literal(Literal { value })
    }

    pub fn binary(op: BinaryOperator, left: Node, right: Node) -> Self {
        Self::Binary(BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(function: Function, args: NonEmpty<Node>) -> Self {
        Self::Call(FunctionCall { function, args })
    }

    /// Number of nodes on the longest path from this node to a leaf.
    pub fn height(&self) -> usize {
        match self {
            Self::Literal(_) | Self::Dice(_) => 1,
            Self::Binary(bin) => 1 + bin.left.height().max(bin.right.height()),
            Self::Call(call) => 1 + call.args.iter().map(Node::height).max().unwrap_or(0),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(x) => fmt::Display::fmt(x, f),
            Self::Dice(x) => fmt::Display::fmt(x, f),
            Self::Binary(x) => fmt::Display::fmt(x, f),
            Self::Call(x) => fmt::Display::fmt(x, f),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Literal {
    pub value: Int,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// An unevaluated `NdM` roll.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiceRoll {
    pub id: NodeId,
    pub count: NonZeroUInt,
    pub sides: NonZeroUInt,
}

impl DiceRoll {
    pub fn new(id: NodeId, count: NonZeroUInt, sides: NonZeroUInt) -> Self {
        Self { id, count, sides }
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BinaryOp {
    pub op: BinaryOperator,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(f, &self.left, self.op, false)?;
        write!(f, " {} ", self.op)?;
        fmt_operand(f, &self.right, self.op, true)
    }
}

// Function calls swallow everything to their right, so they are always
// parenthesized as operands.
fn fmt_operand(f: &mut fmt::Formatter<'_>, node: &Node, parent: BinaryOperator, right: bool) -> fmt::Result {
    let parens = match node {
        Node::Binary(child) => {
            let (child, parent) = (child.op.precedence(), parent.precedence());
            child < parent || (right && child == parent)
        }
        Node::Call(_) => true,
        Node::Literal(_) | Node::Dice(_) => false,
    };

    if parens {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionCall {
    pub function: Function,
    pub args: NonEmpty<Node>,
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.function)?;
        let last = self.args.len() - 1;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if i < last && matches!(arg, Node::Call(_)) {
                write!(f, "({})", arg)?;
            } else {
                write!(f, "{}", arg)?;
            }
        }
        Ok(())
    }
}
