//! Calculation history shared between front ends.
//!
//! One [`HistoryLog`] lives for the whole session and is handed out as an
//! `Arc` to every view that writes or displays history. Views learn about
//! changes through subscriptions and re-read [`HistoryLog::snapshot`].

mod log;
mod record;

pub use log::{HistoryLog, Subscription};
pub use record::CalculationRecord;
