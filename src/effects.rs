//! Per-instance effect handle given to sagas

use crate::{Action, ExecutionContext, ExecutionObserver, RuntimeStats, Store, StoreError};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Lets a running saga read state and emit follow-up actions
pub struct Effects<S> {
    store: Store<S>,
    context: ExecutionContext,
    observer: Arc<dyn ExecutionObserver>,
    stats: Arc<RuntimeStats>,
}

impl<S: Send + Sync + 'static> Effects<S> {
    pub(crate) fn new(
        store: Store<S>,
        context: ExecutionContext,
        observer: Arc<dyn ExecutionObserver>,
    ) -> Self {
        let stats = store.runtime_stats();
        Self {
            store,
            context,
            observer,
            stats,
        }
    }

    /// Dispatch an action back into the store
    pub fn put(&self, action: Action) -> Result<(), StoreError> {
        self.observer.on_action_emitted(&self.context, &action);
        self.stats.actions_emitted.fetch_add(1, Ordering::Relaxed);
        self.store.dispatch(action)
    }

    /// Evaluate `selector` against the current state
    pub fn select<T>(&self, selector: impl FnOnce(&S) -> T) -> T {
        self.store.select(selector)
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }

    /// Identity of this execution
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub(crate) fn observer(&self) -> &Arc<dyn ExecutionObserver> {
        &self.observer
    }

    pub(crate) fn stats(&self) -> &Arc<RuntimeStats> {
        &self.stats
    }
}
