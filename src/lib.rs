//! Keypad calculator core.
//!
//! - [`calculator`] turns a typed expression into a number.
//! - [`history`] keeps the shared, observable log of past calculations.
//! - [`session`] collects keystrokes and wires the two together.

pub mod calculator;
pub mod config;
pub mod history;
pub mod session;

pub use calculator::{CalcError, Calculation, DisplayOptions, ErrorKind, calculate, evaluate};
pub use config::Config;
pub use history::{CalculationRecord, HistoryLog, Subscription};
pub use session::{ExpressionBuffer, Key, Session};
