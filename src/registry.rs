//! Registry of handler chains and custom sagas

use crate::chain::ChainSaga;
use crate::{ActionType, HandlerDescriptor, LifecycleHooks, Saga};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One routine per watched action, frozen once compiled
pub(crate) type CompiledSagas<S> = BTreeMap<ActionType, Arc<dyn Saga<S>>>;

/// Per-action handler chains plus custom routines.
///
/// Append-only: there is no removal. The registry is consumed when the
/// store is created, so it cannot change while watchers run.
pub struct SagaRegistry<S> {
    chains: BTreeMap<ActionType, Vec<HandlerDescriptor<S>>>,
    custom: BTreeMap<ActionType, Arc<dyn Saga<S>>>,
}

impl<S: Send + Sync + 'static> SagaRegistry<S> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            chains: BTreeMap::new(),
            custom: BTreeMap::new(),
        }
    }

    /// Append a handler to the chain of its action
    pub fn register(&mut self, descriptor: HandlerDescriptor<S>) {
        self.chains
            .entry(descriptor.action().clone())
            .or_default()
            .push(descriptor);
    }

    /// Install a custom routine for `action`, replacing any earlier one.
    ///
    /// A custom routine takes precedence over a chain registered for the
    /// same action.
    pub fn register_custom(&mut self, action: impl Into<ActionType>, saga: impl Saga<S>) {
        let action = action.into();
        let saga: Arc<dyn Saga<S>> = Arc::new(saga);
        if self.custom.insert(action.clone(), saga).is_some() {
            tracing::debug!(action = %action, "replaced custom saga");
        }
    }

    /// Handlers registered for `action`, in registration order
    pub fn chain(&self, action: &str) -> &[HandlerDescriptor<S>] {
        self.chains
            .get(&ActionType::from(action))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if `action` has a custom saga
    pub fn has_custom(&self, action: &str) -> bool {
        self.custom.contains_key(&ActionType::from(action))
    }

    /// Every action that will get a watcher
    pub fn action_types(&self) -> Vec<ActionType> {
        let mut types: Vec<ActionType> =
            self.chains.keys().chain(self.custom.keys()).cloned().collect();
        types.sort();
        types.dedup();
        types
    }

    /// True if nothing was registered
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty() && self.custom.is_empty()
    }

    /// Build one routine per action. Does not modify the registry.
    pub(crate) fn compile(&self, hooks: &LifecycleHooks) -> CompiledSagas<S> {
        let mut sagas: CompiledSagas<S> = BTreeMap::new();
        for (action, handlers) in &self.chains {
            if self.custom.contains_key(action) {
                tracing::debug!(
                    action = %action,
                    handlers = handlers.len(),
                    "custom saga overrides handler chain"
                );
                continue;
            }
            let handlers: Arc<[HandlerDescriptor<S>]> = handlers.iter().cloned().collect();
            let chain = ChainSaga::new(action.clone(), handlers, hooks.clone());
            tracing::trace!(action = %action, handlers = chain.len(), "compiled handler chain");
            sagas.insert(action.clone(), Arc::new(chain));
        }
        for (action, saga) in &self.custom {
            sagas.insert(action.clone(), Arc::clone(saga));
        }
        sagas
    }
}

impl<S: Send + Sync + 'static> Default for SagaRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
