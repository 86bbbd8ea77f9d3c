//! Runtime statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Per-store saga runtime statistics
pub struct RuntimeStats {
    /// Actions reduced by the store
    pub actions_dispatched: AtomicU64,
    /// Follow-up actions put by saga instances
    pub actions_emitted: AtomicU64,
    /// Saga instances spawned
    pub executions_started: AtomicU64,
    /// Instances that ran to completion
    pub executions_completed: AtomicU64,
    /// Instances ended by an error or a panic
    pub executions_failed: AtomicU64,
    /// Handler results that took the valid branch
    pub handlers_valid: AtomicU64,
    /// Handler results that took the invalid branch
    pub handlers_invalid: AtomicU64,
    /// Handler async functions that failed
    pub handlers_errored: AtomicU64,
    pending: AtomicU64,
    idle: Notify,
}

impl RuntimeStats {
    /// Zeroed counters
    pub fn new() -> Self {
        Self {
            actions_dispatched: AtomicU64::new(0),
            actions_emitted: AtomicU64::new(0),
            executions_started: AtomicU64::new(0),
            executions_completed: AtomicU64::new(0),
            executions_failed: AtomicU64::new(0),
            handlers_valid: AtomicU64::new(0),
            handlers_invalid: AtomicU64::new(0),
            handlers_errored: AtomicU64::new(0),
            pending: AtomicU64::new(0),
            idle: Notify::new(),
        }
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> RuntimeStatsSnapshot {
        RuntimeStatsSnapshot {
            actions_dispatched: self.actions_dispatched.load(Ordering::Relaxed),
            actions_emitted: self.actions_emitted.load(Ordering::Relaxed),
            executions_started: self.executions_started.load(Ordering::Relaxed),
            executions_completed: self.executions_completed.load(Ordering::Relaxed),
            executions_failed: self.executions_failed.load(Ordering::Relaxed),
            handlers_valid: self.handlers_valid.load(Ordering::Relaxed),
            handlers_invalid: self.handlers_invalid.load(Ordering::Relaxed),
            handlers_errored: self.handlers_errored.load(Ordering::Relaxed),
            pending_executions: self.pending.load(Ordering::Acquire),
        }
    }

    /// Executions queued on a watcher or currently running
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    /// Wait until no execution is queued or running
    pub async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    pub(crate) fn begin_pending(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn end_pending(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl Default for RuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases one pending slot on drop, including during a panic unwind
pub(crate) struct PendingGuard {
    stats: Arc<RuntimeStats>,
}

impl PendingGuard {
    /// Take over a slot already counted by `begin_pending`
    pub(crate) fn adopt(stats: Arc<RuntimeStats>) -> Self {
        Self { stats }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.stats.end_pending();
    }
}

/// Copy of [`RuntimeStats`] at one point in time
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStatsSnapshot {
    /// Actions reduced by the store
    pub actions_dispatched: u64,
    /// Follow-up actions put by saga instances
    pub actions_emitted: u64,
    /// Saga instances spawned
    pub executions_started: u64,
    /// Instances that ran to completion
    pub executions_completed: u64,
    /// Instances ended by an error or a panic
    pub executions_failed: u64,
    /// Handler results that took the valid branch
    pub handlers_valid: u64,
    /// Handler results that took the invalid branch
    pub handlers_invalid: u64,
    /// Handler async functions that failed
    pub handlers_errored: u64,
    /// Instances queued or running
    pub pending_executions: u64,
}
