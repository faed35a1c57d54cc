use std::fmt;

use crate::error::ParseError;

mod evaluator;
mod parser;

pub use evaluator::evaluate;
pub use parser::ExpressionParser as Parser;

/// Restricted arithmetic syntax tree.
///
/// Only whitelisted shapes are representable: any construct outside this set is
/// rejected by the parser before a tree is ever handed out.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Number(f64),
    BinaryOp {
        operator: OperatorKind,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    UnaryOp {
        operator: UnaryOperatorKind,
        operand: Box<ExpressionNode>,
    },
}

impl ExpressionNode {
    pub fn binary(operator: OperatorKind, left: ExpressionNode, right: ExpressionNode) -> Self {
        ExpressionNode::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperatorKind, operand: ExpressionNode) -> Self {
        ExpressionNode::UnaryOp {
            operator,
            operand: Box::new(operand),
        }
    }

    /// Reduces the tree to a number. See [`evaluate`].
    pub fn evaluate(&self) -> Result<f64, crate::error::EvalError> {
        evaluate(self)
    }
}

/// Fully parenthesised form, e.g. `-4**2` renders as `(-(4 ** 2))`.
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Number(value) => write!(f, "{}", value),
            ExpressionNode::UnaryOp { operator, operand } => write!(f, "({}{})", operator, operand),
            ExpressionNode::BinaryOp {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    FloorDiv,
}

impl OperatorKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorKind::Add => "+",
            OperatorKind::Sub => "-",
            OperatorKind::Mul => "*",
            OperatorKind::Div => "/",
            OperatorKind::Mod => "%",
            OperatorKind::Pow => "**",
            OperatorKind::FloorDiv => "//",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for OperatorKind {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(OperatorKind::Add),
            "-" => Ok(OperatorKind::Sub),
            "*" => Ok(OperatorKind::Mul),
            "/" => Ok(OperatorKind::Div),
            "%" => Ok(OperatorKind::Mod),
            "**" => Ok(OperatorKind::Pow),
            "//" => Ok(OperatorKind::FloorDiv),
            _ => Err(ParseError::SyntaxError(format!(
                "unknown operator: {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    Plus,
    Minus,
}

impl UnaryOperatorKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperatorKind::Plus => "+",
            UnaryOperatorKind::Minus => "-",
        }
    }
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for UnaryOperatorKind {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(UnaryOperatorKind::Plus),
            "-" => Ok(UnaryOperatorKind::Minus),
            _ => Err(ParseError::SyntaxError(format!(
                "unknown unary operator: {}",
                value
            ))),
        }
    }
}
