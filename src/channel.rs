//! Fan-out of dispatched actions to the watchers taking them

use crate::{Action, ActionType, RuntimeStats};
use std::sync::Arc;
use tokio::sync::mpsc;

struct Taker {
    pattern: ActionType,
    tx: mpsc::UnboundedSender<Action>,
}

/// Delivers each dispatched action to every taker whose pattern matches.
///
/// The taker set is fixed before the channel is handed to the store.
pub(crate) struct ActionChannel {
    takers: Vec<Taker>,
    stats: Arc<RuntimeStats>,
}

impl ActionChannel {
    pub(crate) fn new(stats: Arc<RuntimeStats>) -> Self {
        Self {
            takers: Vec::new(),
            stats,
        }
    }

    /// Receive every future occurrence of `pattern`
    pub(crate) fn take_every(&mut self, pattern: ActionType) -> mpsc::UnboundedReceiver<Action> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.takers.push(Taker { pattern, tx });
        rx
    }

    /// Each delivery counts as one pending execution until the watcher's
    /// spawned instance finishes.
    pub(crate) fn put(&self, action: &Action) {
        for taker in self.takers.iter().filter(|t| t.pattern == action.kind) {
            self.stats.begin_pending();
            if taker.tx.send(action.clone()).is_err() {
                tracing::debug!(action = %action.kind, "watcher gone, dropping action");
                self.stats.end_pending();
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.takers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_delivers_to_matching_takers() {
        let stats = Arc::new(RuntimeStats::new());
        let mut channel = ActionChannel::new(Arc::clone(&stats));
        let mut fetch = channel.take_every("FETCH".into());
        let mut other = channel.take_every("OTHER".into());
        assert_eq!(channel.len(), 2);

        channel.put(&Action::new("FETCH"));
        channel.put(&Action::new("UNWATCHED"));

        assert_eq!(fetch.try_recv().unwrap(), Action::new("FETCH"));
        assert!(other.try_recv().is_err());
        assert_eq!(stats.pending(), 1);
    }

    #[test]
    fn test_closed_taker_releases_pending() {
        let stats = Arc::new(RuntimeStats::new());
        let mut channel = ActionChannel::new(Arc::clone(&stats));
        drop(channel.take_every("FETCH".into()));

        channel.put(&Action::new("FETCH"));
        assert_eq!(stats.pending(), 0);
    }
}
