//! Input classification for the terminal front end.
//!
//! A line is either keypad input (digits, operators and the control keys
//! `=`, `C`, `<`/`←`) that gets pressed into the expression buffer, or a
//! named command such as `history`.

use lazy_static::lazy_static;
use regex::Regex;

/// Commands understood by the front end, besides keypad input.
const COMMANDS: &[&str] = &["history", "clear", "copy", "export", "help", "quit", "exit"];

lazy_static! {
    /// Matches lines made only of keypad keys and whitespace.
    static ref KEYPAD_INPUT: Regex = Regex::new(
        r"^[\d\s\.\+\-\*/=<←Cc]+$"
    ).unwrap();

    /// Matches a complete expression without control keys.
    static ref EXPRESSION_CHARS: Regex = Regex::new(
        r"^[\d\.\+\-\*/]+$"
    ).unwrap();
}

/// What a line of front-end input asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Keys to press into the expression buffer.
    Keys,
    /// A named command, lowercased.
    Command(String),
    /// Neither; shown back to the user as an error.
    Unknown,
}

/// Classify one line of input.
pub fn classify_input(input: &str) -> InputKind {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return InputKind::Unknown;
    }

    let lower = trimmed.to_lowercase();
    // "c" alone is the clear key, not the start of "clear"
    if lower.len() > 1 && COMMANDS.contains(&lower.as_str()) {
        return InputKind::Command(lower);
    }

    if KEYPAD_INPUT.is_match(trimmed) {
        InputKind::Keys
    } else {
        InputKind::Unknown
    }
}

/// Check if input is a complete keypad expression with at least one operator.
///
/// Plain numbers are not expressions; whitespace is ignored.
pub fn looks_like_expression(input: &str) -> bool {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() < 3 || !EXPRESSION_CHARS.is_match(&cleaned) {
        return false;
    }

    // An operator after the first character means a binary operation
    cleaned
        .chars()
        .skip(1)
        .any(|c| matches!(c, '+' | '-' | '*' | '/'))
}
