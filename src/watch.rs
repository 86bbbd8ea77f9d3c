//! Watchers: one concurrent execution per observed action

use crate::stats::PendingGuard;
use crate::store::WeakStore;
use crate::{
    Action, ActionType, Effects, ExecutionContext, ExecutionError, ExecutionObserver, RuntimeStats,
    Saga,
};
use futures_util::future::join_all;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Long-lived process spawning a new execution of its saga for every
/// occurrence of its action. Earlier executions are never cancelled,
/// throttled or deduplicated.
pub(crate) struct Watcher<S> {
    action_type: ActionType,
    saga: Arc<dyn Saga<S>>,
    rx: mpsc::UnboundedReceiver<Action>,
    stats: Arc<RuntimeStats>,
}

impl<S: Send + Sync + 'static> Watcher<S> {
    pub(crate) fn new(
        action_type: ActionType,
        saga: Arc<dyn Saga<S>>,
        rx: mpsc::UnboundedReceiver<Action>,
        stats: Arc<RuntimeStats>,
    ) -> Self {
        Self {
            action_type,
            saga,
            rx,
            stats,
        }
    }

    /// Runs until the store is dropped
    pub(crate) async fn run(mut self, store: WeakStore<S>, observer: Arc<dyn ExecutionObserver>) {
        tracing::debug!(action = %self.action_type, "Watcher started");
        while let Some(action) = self.rx.recv().await {
            let pending = PendingGuard::adopt(Arc::clone(&self.stats));
            let Some(store) = store.upgrade() else {
                break;
            };
            let context = ExecutionContext::new(self.action_type.clone());
            let effects = Effects::new(store, context, Arc::clone(&observer));
            tokio::spawn(execute(Arc::clone(&self.saga), effects, action, pending));
        }
        tracing::debug!(action = %self.action_type, "Watcher stopped");
    }
}

async fn execute<S>(
    saga: Arc<dyn Saga<S>>,
    effects: Effects<S>,
    action: Action,
    _pending: PendingGuard,
) where
    S: Send + Sync + 'static,
{
    let context = effects.context().clone();
    let observer = Arc::clone(effects.observer());
    let stats = Arc::clone(effects.stats());

    stats.executions_started.fetch_add(1, Ordering::Relaxed);
    observer.on_execution_started(&context);
    let outcome = AssertUnwindSafe(saga.run(effects, action))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(ExecutionError::from_panic(context.action_type.clone(), payload))
        });
    match outcome {
        Ok(()) => {
            stats.executions_completed.fetch_add(1, Ordering::Relaxed);
            observer.on_execution_completed(&context);
        }
        Err(error) => {
            stats.executions_failed.fetch_add(1, Ordering::Relaxed);
            observer.on_execution_failed(&context, &error);
        }
    }
}

/// Top-level process: drives every watcher concurrently
pub(crate) async fn run_all<S>(
    watchers: Vec<Watcher<S>>,
    store: WeakStore<S>,
    observer: Arc<dyn ExecutionObserver>,
) where
    S: Send + Sync + 'static,
{
    let count = watchers.len();
    tracing::info!(watchers = count, "Saga runtime started");
    join_all(
        watchers
            .into_iter()
            .map(|watcher| watcher.run(store.clone(), Arc::clone(&observer))),
    )
    .await;
    tracing::info!(watchers = count, "Saga runtime stopped");
}
