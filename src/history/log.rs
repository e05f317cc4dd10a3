//! The observable history log.

use super::record::CalculationRecord;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

type Observer = Arc<dyn Fn() + Send + Sync>;

/// Handle for a registered observer.
///
/// Dropping the handle does not unsubscribe. An observer whose view has
/// gone away keeps being called until [`HistoryLog::unsubscribe`] is used
/// or the log itself is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

#[derive(Default)]
struct State {
    records: Vec<CalculationRecord>,
    observers: Vec<(u64, Observer)>,
    revision: u64,
}

impl State {
    fn observers(&self) -> Vec<Observer> {
        self.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
    }
}

/// Append-only list of calculations that notifies observers on change.
///
/// Notifications carry no payload, and appending and clearing send the same
/// "updated" signal. Observers re-read [`snapshot`](Self::snapshot) to learn
/// the new contents.
///
/// Observers run synchronously, in registration order, after the change is
/// visible and with no lock held, so they may call `snapshot`.
pub struct HistoryLog {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("HistoryLog")
            .field("records", &state.records)
            .field("subscribers", &state.observers.len())
            .field("revision", &state.revision)
            .finish()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(0),
        }
    }

    // A panicking observer runs outside the lock, so a poisoned mutex still
    // holds consistent state.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a record to the end of the log and notify every observer.
    pub fn append(&self, record: CalculationRecord) {
        let observers = {
            let mut state = self.lock();
            debug!(record = %record, position = state.records.len(), "appending to history");
            state.records.push(record);
            state.revision += 1;
            state.observers()
        };

        notify(&observers);
    }

    /// Remove every record and notify every observer.
    pub fn clear(&self) {
        let observers = {
            let mut state = self.lock();
            debug!(removed = state.records.len(), "clearing history");
            state.records.clear();
            state.revision += 1;
            state.observers()
        };

        notify(&observers);
    }

    /// Register an observer for all future appends and clears.
    pub fn subscribe(&self, observer: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut state = self.lock();
        state.observers.push((id, Arc::new(observer)));
        trace!(id, subscribers = state.observers.len(), "history observer added");

        Subscription { id }
    }

    /// Remove an observer. Returns `false` if it was already removed.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut state = self.lock();
        let before = state.observers.len();
        state.observers.retain(|(id, _)| *id != subscription.id);

        let removed = state.observers.len() != before;
        trace!(id = subscription.id, removed, "history observer removed");
        removed
    }

    /// Subscribe through a channel.
    ///
    /// One `()` is sent per change. Once the receiver is dropped the sends
    /// fail silently and the subscription stays registered.
    pub fn watch(&self) -> flume::Receiver<()> {
        let (tx, rx) = flume::unbounded();
        self.subscribe(move || {
            let _ = tx.send(());
        });
        rx
    }

    /// Copy of the current records, oldest first.
    pub fn snapshot(&self) -> Vec<CalculationRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Number of changes (appends and clears) made so far.
    ///
    /// An observer can compare it against the last value it rendered to
    /// skip redundant redraws.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Export the current records as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

fn notify(observers: &[Observer]) {
    for observer in observers {
        observer();
    }
}
