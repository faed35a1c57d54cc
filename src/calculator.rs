use crate::ast::{evaluate, ExpressionNode, Parser};
use crate::config::Limits;
use crate::error::{CalcResult, ParseError};
use log::debug;
use rayon::prelude::*;

/// Parse-then-evaluate front door.
///
/// Holds nothing but its [`Limits`], so one instance can be shared freely
/// between threads.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Calculator {
    limits: Limits,
}

impl Calculator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Parse an expression string into a whitelisted tree.
    pub fn parse(&self, text: &str) -> Result<ExpressionNode, ParseError> {
        Parser::parse_with_limits(text, &self.limits)
    }

    /// Evaluates a given expression string.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` if parsing and evaluation succeed.
    /// * `Err(CalcError::Parse)` for syntax errors and disallowed constructs.
    /// * `Err(CalcError::Eval)` for division by zero and invalid operations.
    pub fn evaluate_text(&self, text: &str) -> CalcResult<f64> {
        // Step 1: Parse the expression into a whitelisted tree
        let ast = self.parse(text)?;

        // Step 2: Reduce the tree
        let value = evaluate(&ast)?;
        debug!("Evaluated {:?} to {}", text, value);
        Ok(value)
    }

    /// Evaluates every input independently and in parallel, keeping input order.
    pub fn evaluate_batch<S>(&self, inputs: &[S]) -> Vec<CalcResult<f64>>
    where
        S: AsRef<str> + Sync,
    {
        inputs
            .par_iter()
            .map(|text| self.evaluate_text(text.as_ref()))
            .collect()
    }
}
