//! Keystroke collection and the calculate-then-record flow.
//!
//! A [`Session`] is one calculator view. Several sessions may share a
//! single [`HistoryLog`]; each successful `=` appends to it.

use crate::calculator::{CalcError, Calculation, DisplayOptions, calculate};
use crate::history::{CalculationRecord, HistoryLog};
use std::sync::Arc;
use tracing::debug;

/// A key on the calculator keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Appended to the expression as-is. Digits, `.` and operators are
    /// the expected characters; anything else fails at evaluation time.
    Char(char),
    Equals,
    Backspace,
    Clear,
}

impl Key {
    /// Map a typed character to a key. `<` and `←` erase, `C` clears.
    pub fn from_char(c: char) -> Self {
        match c {
            '=' => Self::Equals,
            '<' | '←' => Self::Backspace,
            'C' | 'c' => Self::Clear,
            other => Self::Char(other),
        }
    }
}

/// The expression typed so far. Never validated while it is being built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Return the expression and leave the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// What the calculator view shows: the expression line and the result line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Readout {
    pub expression: String,
    /// Shown as `=<result>` after a successful calculation.
    pub result: Option<String>,
}

/// One calculator view writing into a shared history.
#[derive(Debug)]
pub struct Session {
    history: Arc<HistoryLog>,
    options: DisplayOptions,
    buffer: ExpressionBuffer,
    result: Option<String>,
}

impl Session {
    pub fn new(history: Arc<HistoryLog>, options: DisplayOptions) -> Self {
        Self {
            history,
            options,
            buffer: ExpressionBuffer::new(),
            result: None,
        }
    }

    pub fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    pub fn readout(&self) -> Readout {
        Readout {
            expression: self.buffer.as_str().to_string(),
            result: self.result.as_ref().map(|r| format!("={}", r)),
        }
    }

    /// Press one key.
    ///
    /// Returns `Ok(Some(_))` when `=` produced a result, which has then been
    /// appended to the history. On failure nothing is recorded and the
    /// expression is reset so the user can start over.
    pub fn press(&mut self, key: Key) -> Result<Option<Calculation>, CalcError> {
        // A shown result goes away as soon as a new expression starts
        if self.buffer.is_empty() {
            self.result = None;
        }

        match key {
            Key::Char(c) => self.buffer.push(c),
            Key::Backspace => self.buffer.backspace(),
            Key::Clear => self.buffer.clear(),
            Key::Equals => return self.equals().map(Some),
        }

        Ok(None)
    }

    /// Press every key in `keys`, skipping whitespace.
    ///
    /// Returns the outcome of each `=` in order.
    pub fn feed(&mut self, keys: &str) -> Vec<Result<Calculation, CalcError>> {
        keys.chars()
            .filter(|c| !c.is_whitespace())
            .filter_map(|c| self.press(Key::from_char(c)).transpose())
            .collect()
    }

    fn equals(&mut self) -> Result<Calculation, CalcError> {
        let expression = self.buffer.take();

        match calculate(&expression, &self.options) {
            Ok(calc) => {
                self.result = Some(calc.display_result.clone());
                self.history.append(CalculationRecord::from(&calc));
                Ok(calc)
            }
            Err(err) => {
                debug!(expression = %expression, error = %err, "calculation failed");
                self.result = None;
                Err(err)
            }
        }
    }
}
