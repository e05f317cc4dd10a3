//! Expression evaluation.
//!
//! Accepts a number optionally followed by `(operator number)` pairs.
//! `*` and `/` bind tighter than `+` and `-`, and operators of equal
//! precedence apply left to right. There are no parentheses and no unary
//! signs.

use super::tokenize::{Operator, Token, tokenize};
use thiserror::Error;
use tracing::trace;

/// Why part of an expression could not be read as `number (op number)*`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("\"{0}\" has more than one decimal point")]
    ExtraDecimalPoint(String),
    #[error("\"{0}\" is not a number")]
    NotANumber(String),
    #[error("'{0}' cannot start an expression")]
    LeadingOperator(char),
    #[error("'{0}' cannot end an expression")]
    TrailingOperator(char),
    #[error("'{0}' is followed by '{1}'")]
    ConsecutiveOperators(char, char),
}

/// A failed evaluation.
///
/// Every variant is a user input problem; the message is meant for display.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Enter an expression first")]
    EmptyExpression,
    #[error("Malformed expression at position {position}: {problem}")]
    MalformedNumber { position: usize, problem: Malformed },
    #[error("Cannot divide by zero (position {position})")]
    DivisionByZero { position: usize },
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("Result is too large to display")]
    Overflow,
}

/// Category of a [`CalcError`], without its details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyExpression,
    MalformedNumber,
    DivisionByZero,
    UnexpectedCharacter,
    Overflow,
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyExpression => ErrorKind::EmptyExpression,
            Self::MalformedNumber { .. } => ErrorKind::MalformedNumber,
            Self::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            Self::UnexpectedCharacter { .. } => ErrorKind::UnexpectedCharacter,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}

/// Most fractional digits a result is rendered with; beyond this `f64`
/// has no precision left to show.
pub const MAX_DECIMALS: usize = 17;

/// How results are rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Group the integer part with `,` every three digits.
    pub thousands_separators: bool,
    /// Fractional digits kept before trailing zeros are trimmed, capped at
    /// [`MAX_DECIMALS`].
    pub max_decimals: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            thousands_separators: true,
            max_decimals: 10,
        }
    }
}

impl DisplayOptions {
    /// Plain number without separators, for history lines and the clipboard.
    pub fn raw(&self) -> Self {
        Self {
            thousands_separators: false,
            max_decimals: self.max_decimals,
        }
    }
}

/// A successful calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Calculation {
    /// The expression as typed.
    pub expression: String,
    /// The numeric value.
    pub value: f64,
    /// Formatted for display (with thousand separators when enabled).
    pub display_result: String,
    /// Formatted for clipboard (raw number).
    pub clipboard_result: String,
}

/// Evaluate a keypad expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    let (first, rest) = parse(&tokens)?;

    // Completed `+`/`-` terms accumulate in `total`; `term` is the
    // multiplicative run currently being built.
    let mut total = 0.0;
    let mut pending = Operator::Add;
    let mut term = first;

    for (op, value, position) in rest {
        if op.is_multiplicative() {
            term = apply_multiplicative(term, op, value, position)?;
        } else {
            total = apply_additive(total, pending, term);
            pending = op;
            term = value;
        }

        if !term.is_finite() || !total.is_finite() {
            return Err(CalcError::Overflow);
        }
    }

    let value = apply_additive(total, pending, term);
    if !value.is_finite() {
        return Err(CalcError::Overflow);
    }

    trace!(expression, value, "evaluated expression");
    Ok(value)
}

/// Evaluate an expression and format the result.
pub fn calculate(expression: &str, options: &DisplayOptions) -> Result<Calculation, CalcError> {
    let value = evaluate(expression)?;

    Ok(Calculation {
        expression: expression.to_string(),
        value,
        display_result: format_result(value, options),
        clipboard_result: format_result(value, &options.raw()),
    })
}

fn apply_multiplicative(
    term: f64,
    op: Operator,
    value: f64,
    position: usize,
) -> Result<f64, CalcError> {
    match op {
        Operator::Divide if value == 0.0 => Err(CalcError::DivisionByZero { position }),
        Operator::Divide => Ok(term / value),
        _ => Ok(term * value),
    }
}

fn apply_additive(total: f64, op: Operator, term: f64) -> f64 {
    match op {
        Operator::Subtract => total - term,
        _ => total + term,
    }
}

type Operand = (Operator, f64, usize);

/// Check that tokens alternate number/operator/number and read the numbers.
///
/// Returns the leading number and every following `(operator, number)`
/// pair, where the position is that of the operand.
fn parse(tokens: &[Token]) -> Result<(f64, Vec<Operand>), CalcError> {
    if !tokens.iter().any(Token::is_number) {
        return Err(CalcError::EmptyExpression);
    }

    let mut first = None;
    let mut rest = Vec::with_capacity(tokens.len() / 2);
    let mut pending: Option<(Operator, usize)> = None;

    for token in tokens {
        match token {
            Token::Number { text, position } => {
                let value = parse_number(text, *position)?;
                match pending.take() {
                    Some((op, _)) => rest.push((op, value, *position)),
                    None => first = Some(value),
                }
            }
            Token::Operator { op, position } => {
                if first.is_none() {
                    return Err(malformed(*position, Malformed::LeadingOperator(op.symbol())));
                }
                if let Some((previous, _)) = pending {
                    return Err(malformed(
                        *position,
                        Malformed::ConsecutiveOperators(previous.symbol(), op.symbol()),
                    ));
                }
                pending = Some((*op, *position));
            }
        }
    }

    if let Some((op, position)) = pending {
        return Err(malformed(position, Malformed::TrailingOperator(op.symbol())));
    }

    // At least one number token exists and a leading operator returns early.
    let first = first.ok_or(CalcError::EmptyExpression)?;
    Ok((first, rest))
}

fn parse_number(text: &str, position: usize) -> Result<f64, CalcError> {
    let value: f64 = text
        .parse()
        .map_err(|_| malformed(position, Malformed::NotANumber(text.to_string())))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Overflow)
    }
}

fn malformed(position: usize, problem: Malformed) -> CalcError {
    CalcError::MalformedNumber { position, problem }
}

/// Format a result for display.
///
/// Whole numbers have no fractional part; other values keep at most
/// `max_decimals` digits with trailing zeros removed. A non-zero value too
/// small to survive that rounding is shown in full instead of as `0`.
pub fn format_result(value: f64, options: &DisplayOptions) -> String {
    let decimals = options.max_decimals.min(MAX_DECIMALS);
    let formatted = format!("{:.*}", decimals, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };

    if unsigned == "0" {
        // Rounding can leave "-0", or swallow every significant digit
        return if value == 0.0 {
            "0".to_string()
        } else {
            value.to_string()
        };
    }

    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    if options.thousands_separators {
        format!("{}{}{}", sign, format_with_separators(int_part), frac_part)
    } else {
        format!("{}{}{}", sign, int_part, frac_part)
    }
}

/// Insert `,` every three digits of an unsigned integer string.
fn format_with_separators(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(expression: &str) -> ErrorKind {
        evaluate(expression).unwrap_err().kind()
    }

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(evaluate("2+2"), Ok(4.0));
        assert_eq!(evaluate("42"), Ok(42.0));
        assert_eq!(evaluate("1.5*2"), Ok(3.0));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2+3*4"), Ok(14.0));
        assert_eq!(evaluate("2*3+4"), Ok(10.0));
        assert_eq!(evaluate("10-6/2"), Ok(7.0));
        assert_eq!(evaluate("1+2*3-4/2"), Ok(5.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(evaluate("10-2-3"), Ok(5.0));
        assert_eq!(evaluate("8/4/2"), Ok(1.0));
        assert_eq!(evaluate("2*6/3"), Ok(4.0));
        assert_eq!(evaluate("1-2+3"), Ok(2.0));
    }

    #[test]
    fn test_negative_result() {
        assert_eq!(evaluate("2-5"), Ok(-3.0));
    }

    #[test]
    fn test_partial_decimals() {
        assert_eq!(evaluate("5.+.5"), Ok(5.5));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(evaluate(""), Err(CalcError::EmptyExpression));
        assert_eq!(kind("+"), ErrorKind::EmptyExpression);
        assert_eq!(kind("*/"), ErrorKind::EmptyExpression);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("5/0"), Err(CalcError::DivisionByZero { position: 2 }));
        assert_eq!(kind("1+4/0.0"), ErrorKind::DivisionByZero);
        assert_eq!(kind("0/0"), ErrorKind::DivisionByZero);
        // Zero only matters as a divisor
        assert_eq!(evaluate("0/5"), Ok(0.0));
        assert_eq!(evaluate("5-5"), Ok(0.0));
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(kind("5..3+2"), ErrorKind::MalformedNumber);
        assert_eq!(kind("1.2.3"), ErrorKind::MalformedNumber);
        assert_eq!(
            evaluate("."),
            Err(CalcError::MalformedNumber {
                position: 0,
                problem: Malformed::NotANumber(".".to_string()),
            })
        );
    }

    #[test]
    fn test_operator_placement() {
        assert_eq!(
            evaluate("5++2"),
            Err(CalcError::MalformedNumber {
                position: 2,
                problem: Malformed::ConsecutiveOperators('+', '+'),
            })
        );
        assert_eq!(
            evaluate("3+"),
            Err(CalcError::MalformedNumber {
                position: 1,
                problem: Malformed::TrailingOperator('+'),
            })
        );
        assert_eq!(
            evaluate("-3"),
            Err(CalcError::MalformedNumber {
                position: 0,
                problem: Malformed::LeadingOperator('-'),
            })
        );
        assert_eq!(kind("2*-3"), ErrorKind::MalformedNumber);
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            evaluate("2^3"),
            Err(CalcError::UnexpectedCharacter {
                character: '^',
                position: 1,
            })
        );
        assert_eq!(kind("(1+2)"), ErrorKind::UnexpectedCharacter);
        assert_eq!(kind("5/0x"), ErrorKind::UnexpectedCharacter);
    }

    #[test]
    fn test_overflow() {
        let huge = "9".repeat(400);
        assert_eq!(evaluate(&huge), Err(CalcError::Overflow));

        let big = format!("1{}", "0".repeat(300));
        assert_eq!(evaluate(&format!("{big}*{big}")), Err(CalcError::Overflow));
    }

    #[test]
    fn test_idempotent() {
        for expression in ["2+3*4", "5/0", "5..3", "", "7*"] {
            assert_eq!(evaluate(expression), evaluate(expression));
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CalcError::DivisionByZero { position: 2 }.to_string(),
            "Cannot divide by zero (position 2)"
        );
        assert_eq!(
            evaluate("3+").unwrap_err().to_string(),
            "Malformed expression at position 1: '+' cannot end an expression"
        );
    }

    #[test]
    fn test_format_whole_numbers() {
        let raw = DisplayOptions::default().raw();
        assert_eq!(format_result(4.0, &raw), "4");
        assert_eq!(format_result(-3.0, &raw), "-3");
        assert_eq!(format_result(0.0, &raw), "0");
        assert_eq!(format_result(-0.0, &raw), "0");
        assert_eq!(format_result(1e20, &raw), "100000000000000000000");
    }

    #[test]
    fn test_format_decimals() {
        let raw = DisplayOptions::default().raw();
        assert_eq!(format_result(0.1 + 0.2, &raw), "0.3");
        assert_eq!(format_result(2.5, &raw), "2.5");
        assert!(format_result(1.0 / 3.0, &raw).starts_with("0.333"));

        let short = DisplayOptions {
            thousands_separators: false,
            max_decimals: 2,
        };
        assert_eq!(format_result(2.0 / 3.0, &short), "0.67");
        assert_eq!(format_result(-0.001, &short), "-0.001");
    }

    #[test]
    fn test_format_tiny_values_keep_their_digits() {
        let options = DisplayOptions::default();
        assert_eq!(format_result(1e-11, &options), "0.00000000001");
        assert_eq!(format_result(-1e-11, &options.raw()), "-0.00000000001");

        let calc = calculate("1/100000000000", &options).unwrap();
        assert_eq!(calc.value, 1e-11);
        assert_eq!(calc.display_result, "0.00000000001");
        assert_eq!(calc.clipboard_result, "0.00000000001");
    }

    #[test]
    fn test_decimals_are_capped() {
        let wide = DisplayOptions {
            thousands_separators: false,
            max_decimals: usize::MAX,
        };
        assert_eq!(format_result(0.5, &wide), "0.5");
        assert_eq!(format_result(2.0, &wide), "2");
    }

    #[test]
    fn test_thousand_separators() {
        let options = DisplayOptions::default();
        assert_eq!(format_result(1_000_000.0, &options), "1,000,000");
        assert_eq!(format_result(-1234.5, &options), "-1,234.5");
        assert_eq!(format_result(999.0, &options), "999");
    }

    #[test]
    fn test_calculate() {
        let calc = calculate("1000*1000", &DisplayOptions::default()).unwrap();
        assert_eq!(calc.expression, "1000*1000");
        assert_eq!(calc.value, 1_000_000.0);
        assert_eq!(calc.display_result, "1,000,000");
        assert_eq!(calc.clipboard_result, "1000000");

        assert_eq!(
            calculate("1/0", &DisplayOptions::default()).unwrap_err().kind(),
            ErrorKind::DivisionByZero
        );
    }
}
