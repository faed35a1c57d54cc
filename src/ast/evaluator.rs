use crate::ast::{ExpressionNode, OperatorKind, UnaryOperatorKind};
use crate::error::EvalError;
use log::trace;

/// Evaluates an [`ExpressionNode`] to a number.
///
/// The left operand of a binary node is always reduced before the right one,
/// so when both sides fail the left side's error is the one returned.
pub fn evaluate(ast: &ExpressionNode) -> Result<f64, EvalError> {
    match ast {
        ExpressionNode::Number(n) => Ok(*n),

        ExpressionNode::UnaryOp { operator, operand } => {
            let value = evaluate(operand)?;
            Ok(operator.apply(value))
        }

        ExpressionNode::BinaryOp {
            operator,
            left,
            right,
        } => {
            let left_value = evaluate(left)?;
            let right_value = evaluate(right)?;
            let result = operator.apply(left_value, right_value);
            trace!("{} {} {} = {:?}", left_value, operator, right_value, result);
            result
        }
    }
}

impl UnaryOperatorKind {
    pub fn apply(&self, operand: f64) -> f64 {
        match self {
            UnaryOperatorKind::Plus => operand,
            UnaryOperatorKind::Minus => -operand,
        }
    }
}

impl OperatorKind {
    pub fn apply(&self, left: f64, right: f64) -> Result<f64, EvalError> {
        match self {
            OperatorKind::Add => Ok(left + right),
            OperatorKind::Sub => Ok(left - right),
            OperatorKind::Mul => Ok(left * right),
            OperatorKind::Div => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(left / right)
                }
            }
            OperatorKind::Mod => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(floor_div_mod(left, right).1)
                }
            }
            OperatorKind::FloorDiv => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(floor_div_mod(left, right).0)
                }
            }
            OperatorKind::Pow => power(left, right),
        }
    }
}

/// Floor quotient and remainder; the remainder takes the divisor's sign.
///
/// The quotient is derived from the remainder instead of `(l / r).floor()`, which
/// would round `1 / 0.1` up to 10 before flooring.
fn floor_div_mod(left: f64, right: f64) -> (f64, f64) {
    let mut remainder = left % right;
    let mut quotient = (left - remainder) / right;

    if remainder != 0.0 {
        if (right < 0.0) != (remainder < 0.0) {
            remainder += right;
            quotient -= 1.0;
        }
    } else {
        remainder = 0.0_f64.copysign(right);
    }

    let floor_quotient = if quotient != 0.0 {
        let floored = quotient.floor();
        if quotient - floored > 0.5 {
            floored + 1.0
        } else {
            floored
        }
    } else {
        0.0_f64.copysign(left / right)
    };

    (floor_quotient, remainder)
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base.is_finite() && exponent.is_finite() {
        if base == 0.0 && exponent < 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        if base < 0.0 && exponent.fract() != 0.0 {
            return Err(EvalError::invalid(
                "negative number cannot be raised to a fractional power",
            ));
        }
    }

    let result = base.powf(exponent);
    if result.is_infinite() && base.is_finite() && exponent.is_finite() {
        return Err(EvalError::invalid("numerical result out of range"));
    }
    Ok(result)
}
