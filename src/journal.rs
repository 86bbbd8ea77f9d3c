//! In-memory journal of dispatched actions

use crate::{Action, ActionType, ExecutionContext, Middleware};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// One recorded dispatch
#[derive(Clone, Debug)]
pub struct JournalEntry {
    /// Position in dispatch order, starting at 1
    pub sequence: u64,
    /// Wall-clock time of the dispatch
    pub recorded_at_millis: u64,
    /// The dispatched action
    pub action: Action,
}

/// Middleware recording every dispatched action in reduction order
pub struct ActionJournal {
    entries: RwLock<Vec<JournalEntry>>,
    counter: AtomicU64,
}

impl ActionJournal {
    /// Empty journal
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            counter: AtomicU64::new(1),
        }
    }

    /// Snapshot of every recorded entry
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded actions in dispatch order
    pub fn actions(&self) -> Vec<Action> {
        self.entries().into_iter().map(|entry| entry.action).collect()
    }

    /// Action identifiers in dispatch order
    pub fn kinds(&self) -> Vec<ActionType> {
        self.entries().into_iter().map(|entry| entry.action.kind).collect()
    }

    /// Number of recorded dispatches of `kind`
    pub fn count(&self, kind: &str) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.action.is(kind))
            .count()
    }

    /// Number of recorded dispatches
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if nothing was dispatched yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActionJournal {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Middleware<S> for ActionJournal {
    fn on_dispatch(&self, action: &Action, _state: &S) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        entries.push(JournalEntry {
            sequence,
            recorded_at_millis: ExecutionContext::now_millis(),
            action: action.clone(),
        });
    }
}
