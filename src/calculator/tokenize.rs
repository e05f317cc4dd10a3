//! Splitting keypad expressions into tokens.
//!
//! Digits and decimal points run together into a single number token,
//! every operator is a token of its own. Nothing here checks whether the
//! tokens form a valid expression; that happens during evaluation.

use super::evaluation::{CalcError, Malformed};

/// One of the four keypad operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Map a keypad character to its operator.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            _ => None,
        }
    }

    /// The character this operator is typed as.
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Whether this operator binds tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Self::Multiply | Self::Divide)
    }
}

/// A classified piece of an expression.
///
/// `position` is the character index (not byte offset) where the token
/// starts, counted the same way as positions in [`CalcError`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Number { text: String, position: usize },
    Operator { op: Operator, position: usize },
}

impl Token {
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number { .. })
    }
}

/// Characters a keypad expression may contain.
pub(crate) fn is_keypad_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || Operator::from_char(c).is_some()
}

/// Split `input` into number and operator tokens, left to right.
///
/// Any character outside `0-9 . + - * /` is reported before anything else,
/// so `"5..3x"` fails on the `x` rather than on the second decimal point.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    if let Some((position, character)) = input
        .chars()
        .enumerate()
        .find(|&(_, c)| !is_keypad_char(c))
    {
        return Err(CalcError::UnexpectedCharacter {
            character,
            position,
        });
    }

    let mut tokens = Vec::new();
    let mut number = String::new();
    let mut start = 0;

    for (position, c) in input.chars().enumerate() {
        if let Some(op) = Operator::from_char(c) {
            push_number(&mut tokens, &mut number, start)?;
            tokens.push(Token::Operator { op, position });
        } else {
            if number.is_empty() {
                start = position;
            }
            number.push(c);
        }
    }
    push_number(&mut tokens, &mut number, start)?;

    Ok(tokens)
}

fn push_number(
    tokens: &mut Vec<Token>,
    number: &mut String,
    position: usize,
) -> Result<(), CalcError> {
    if number.is_empty() {
        return Ok(());
    }

    let text = std::mem::take(number);
    if text.matches('.').count() > 1 {
        return Err(CalcError::MalformedNumber {
            position,
            problem: Malformed::ExtraDecimalPoint(text),
        });
    }

    tokens.push(Token::Number { text, position });
    Ok(())
}
