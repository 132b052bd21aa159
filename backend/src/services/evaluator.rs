//! Arithmetic evaluator behind calculation records.

use crate::errors::CalculationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
        }
    }

    fn apply(&self, acc: f64, operand: f64) -> f64 {
        match self {
            Operation::Add => acc + operand,
            Operation::Sub => acc - operand,
            Operation::Mul => acc * operand,
            Operation::Div => acc / operand,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "sub" => Ok(Operation::Sub),
            "mul" => Ok(Operation::Mul),
            "div" => Ok(Operation::Div),
            other => Err(CalculationError::InvalidOperation(other.to_string())),
        }
    }
}

/// Folds `operands` left to right with `operation`.
pub fn evaluate(operation: Operation, operands: &[f64]) -> Result<f64, CalculationError> {
    let (first, rest) = match operands {
        [first, rest @ ..] if !rest.is_empty() => (*first, rest),
        _ => return Err(CalculationError::InsufficientOperands(operands.len())),
    };

    if operation == Operation::Div && rest.iter().any(|operand| *operand == 0.0) {
        return Err(CalculationError::DivisionByZero);
    }

    Ok(rest
        .iter()
        .fold(first, |acc, operand| operation.apply(acc, *operand)))
}

/// Parses the operation name and evaluates it.
pub fn compute(operation: &str, operands: &[f64]) -> Result<f64, CalculationError> {
    let operation = operation.parse::<Operation>()?;
    evaluate(operation, operands)
}
