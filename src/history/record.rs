use crate::calculator::Calculation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A finished calculation: what was typed and what it evaluated to.
///
/// Records are values. Two records are equal when their expression and
/// result are equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    expression: String,
    result: f64,
}

impl CalculationRecord {
    pub fn new(expression: impl Into<String>, result: f64) -> Self {
        Self {
            expression: expression.into(),
            result,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> f64 {
        self.result
    }
}

impl From<&Calculation> for CalculationRecord {
    fn from(calc: &Calculation) -> Self {
        Self::new(calc.expression.clone(), calc.value)
    }
}

/// Renders the history line, e.g. `2+2=4`, with the result at full precision.
impl fmt::Display for CalculationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Normalize -0
        let result = if self.result == 0.0 { 0.0 } else { self.result };
        write!(f, "{}={}", self.expression, result)
    }
}
