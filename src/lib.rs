//! Safe arithmetic evaluation.
//!
//! Text is parsed into a tree that can only hold numbers and the whitelisted
//! operators `+ - * / % ** //` (plus unary `+`/`-`), then reduced to an `f64`.
//! Names, calls, strings, comparisons and every other general-expression
//! construct are rejected at parse time with
//! [`ParseError::DisallowedConstruct`].
//!
//! ```
//! use safecalc::{evaluate_text, format_number, ErrorKind};
//!
//! assert_eq!(evaluate_text("2.5 * (3 - 1)").unwrap(), 5.0);
//! assert_eq!(format_number(evaluate_text("10 // 3").unwrap()), "3");
//! assert_eq!(evaluate_text("5 / 0").unwrap_err().kind(), ErrorKind::DivisionByZero);
//! ```

pub mod ast;
pub mod calculator;
pub mod config;
pub mod error;
pub mod format;

pub use ast::{evaluate, ExpressionNode, OperatorKind, UnaryOperatorKind};
pub use calculator::Calculator;
pub use config::Limits;
pub use error::{CalcError, CalcResult, ErrorKind, EvalError, ParseError};
pub use format::format_number;

/// Parses `text` into a whitelisted tree using the default [`Limits`].
pub fn parse(text: &str) -> Result<ExpressionNode, ParseError> {
    Calculator::default().parse(text)
}

/// Parses and evaluates `text` using the default [`Limits`].
pub fn evaluate_text(text: &str) -> CalcResult<f64> {
    Calculator::default().evaluate_text(text)
}

/// Evaluates independent expressions in parallel, preserving input order.
pub fn evaluate_batch<S>(inputs: &[S]) -> Vec<CalcResult<f64>>
where
    S: AsRef<str> + Sync,
{
    Calculator::default().evaluate_batch(inputs)
}
