//! Store middleware

use crate::channel::ActionChannel;
use crate::Action;

/// Hook run for every dispatched action, after reduction.
///
/// Middleware runs while the store serializes reductions. Dispatching to the
/// same store from here fails with
/// [`StoreError::Reentrant`](crate::StoreError::Reentrant); use a store
/// subscriber or a saga for follow-up actions.
pub trait Middleware<S>: Send + Sync + 'static {
    /// Called with the action and the state it produced
    fn on_dispatch(&self, action: &Action, state: &S);
}

/// Feeds dispatched actions to the saga watchers
pub(crate) struct SagaMiddleware {
    channel: ActionChannel,
}

impl SagaMiddleware {
    pub(crate) fn new(channel: ActionChannel) -> Self {
        Self { channel }
    }
}

impl<S> Middleware<S> for SagaMiddleware {
    fn on_dispatch(&self, action: &Action, _state: &S) {
        self.channel.put(action);
    }
}

/// Developer-tooling hook: logs each dispatched action as JSON
pub struct DevToolsLogger;

impl<S> Middleware<S> for DevToolsLogger {
    fn on_dispatch(&self, action: &Action, _state: &S) {
        match serde_json::to_string(action) {
            Ok(json) => tracing::debug!(target: "saga_store::devtools", action = %json, "dispatch"),
            Err(e) => {
                tracing::warn!(
                    target: "saga_store::devtools",
                    action = %action.kind,
                    error = %e,
                    "unserializable action"
                )
            }
        }
    }
}
