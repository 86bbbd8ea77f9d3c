//! Auto-compiled handler chains

use crate::pipeline::run_handler;
use crate::{Action, ActionType, Effects, ExecutionError, HandlerDescriptor, LifecycleHooks, Saga};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs every handler registered for one action, strictly in registration
/// order, between the lifecycle hooks.
///
/// A handler whose async function fails or whose result is invalid does not
/// stop the chain. A failing callback does: the instance ends without
/// running later handlers or `on_after`.
pub(crate) struct ChainSaga<S> {
    action_type: ActionType,
    handlers: Arc<[HandlerDescriptor<S>]>,
    hooks: LifecycleHooks,
}

impl<S> ChainSaga<S> {
    pub(crate) fn new(
        action_type: ActionType,
        handlers: Arc<[HandlerDescriptor<S>]>,
        hooks: LifecycleHooks,
    ) -> Self {
        Self {
            action_type,
            handlers,
            hooks,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

#[async_trait]
impl<S> Saga<S> for ChainSaga<S>
where
    S: Send + Sync + 'static,
{
    async fn run(&self, effects: Effects<S>, action: Action) -> Result<(), ExecutionError> {
        self.hooks.before(&self.action_type);
        for (index, handler) in self.handlers.iter().enumerate() {
            run_handler(handler, index, &effects, &action).await?;
        }
        self.hooks.after(&self.action_type);
        Ok(())
    }
}
