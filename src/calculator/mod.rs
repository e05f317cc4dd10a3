//! Calculator module for evaluating keypad expressions.
//!
//! This module provides functionality to:
//! - Split an expression into number and operator tokens
//! - Evaluate expressions with `*` and `/` binding tighter than `+` and `-`
//! - Classify front-end input as keypad keys or commands
//! - Copy results to the clipboard

mod clipboard;
mod detection;
mod evaluation;
mod tokenize;

pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use detection::{InputKind, classify_input, looks_like_expression};
pub use evaluation::{
    CalcError, Calculation, DisplayOptions, ErrorKind, MAX_DECIMALS, Malformed, calculate,
    evaluate, format_result,
};
pub use tokenize::{Operator, Token, tokenize};
