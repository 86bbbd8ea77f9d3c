//! Store manager: registration API and runtime bootstrap

use crate::channel::ActionChannel;
use crate::middleware::SagaMiddleware;
use crate::watch::{run_all, Watcher};
use crate::{
    Action, ActionType, ConfigError, DevToolsLogger, ExecutionObserver, HandlerDescriptor,
    LifecycleHooks, Middleware, RuntimeStats, Saga, SagaRegistry, Store, TracingObserver,
};
use std::sync::Arc;

/// Construction-time settings of a [`StoreManager`]
#[derive(Clone)]
pub struct StoreManagerConfig {
    /// Hooks wrapping every auto-compiled chain execution
    pub hooks: LifecycleHooks,
    /// Log every dispatched action through [`DevToolsLogger`]
    pub devtools_enabled: bool,
    /// Receives execution and handler events
    pub observer: Arc<dyn ExecutionObserver>,
}

impl StoreManagerConfig {
    /// Hook called before each auto-compiled chain instance
    pub fn on_before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActionType) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_before(hook);
        self
    }

    /// Hook called after each auto-compiled chain instance
    pub fn on_after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActionType) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_after(hook);
        self
    }

    /// Toggle the devtools logger middleware
    pub fn devtools(mut self, enabled: bool) -> Self {
        self.devtools_enabled = enabled;
        self
    }

    /// Replace the default tracing observer
    pub fn observer(mut self, observer: impl ExecutionObserver) -> Self {
        self.observer = Arc::new(observer);
        self
    }
}

impl Default for StoreManagerConfig {
    fn default() -> Self {
        Self {
            hooks: LifecycleHooks::default(),
            devtools_enabled: false,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl std::fmt::Debug for StoreManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreManagerConfig")
            .field("hooks", &self.hooks)
            .field("devtools_enabled", &self.devtools_enabled)
            .finish()
    }
}

/// Collects handler chains and custom sagas, then starts them on a store.
///
/// ```rust,ignore
/// let mut manager = StoreManager::new();
/// manager.add_async_func(
///     HandlerDescriptor::new("FETCH_VALUE", |_input| async { Ok(json!("GoodValue")) })
///         .valid_target("RECEIVE_VALUE")
///         .err_target("FETCH_FAILED"),
/// );
/// let store = manager.create_store(reducer, AppState::default(), Vec::new())?;
/// store.dispatch(Action::new("FETCH_VALUE"))?;
/// ```
pub struct StoreManager<S> {
    registry: SagaRegistry<S>,
    config: StoreManagerConfig,
}

impl<S: Send + Sync + 'static> StoreManager<S> {
    /// Manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(StoreManagerConfig::default())
    }

    /// Manager with an explicit configuration
    pub fn with_config(config: StoreManagerConfig) -> Self {
        Self {
            registry: SagaRegistry::new(),
            config,
        }
    }

    /// Append a handler to the chain of its action
    pub fn add_async_func(&mut self, descriptor: HandlerDescriptor<S>) -> &mut Self {
        self.registry.register(descriptor);
        self
    }

    /// Install a custom saga for `action`, overriding any handler chain
    pub fn add_saga(&mut self, action: impl Into<ActionType>, saga: impl Saga<S>) -> &mut Self {
        self.registry.register_custom(action, saga);
        self
    }

    /// Registered chains and custom sagas
    pub fn registry(&self) -> &SagaRegistry<S> {
        &self.registry
    }

    /// Construction-time settings
    pub fn config(&self) -> &StoreManagerConfig {
        &self.config
    }

    /// Compile the registry, start one watcher per action and return the
    /// live store.
    ///
    /// `middlewares` run after the devtools logger (when enabled) and before
    /// the saga middleware. Must be called from within a tokio runtime.
    pub fn create_store<R>(
        self,
        reducer: R,
        initial_state: S,
        middlewares: Vec<Arc<dyn Middleware<S>>>,
    ) -> Result<Store<S>, ConfigError>
    where
        R: Fn(&S, &Action) -> S + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
        let stats = Arc::new(RuntimeStats::new());

        let sagas = self.registry.compile(&self.config.hooks);
        let mut channel = ActionChannel::new(Arc::clone(&stats));
        let watchers: Vec<Watcher<S>> = sagas
            .into_iter()
            .map(|(action_type, saga)| {
                let rx = channel.take_every(action_type.clone());
                Watcher::new(action_type, saga, rx, Arc::clone(&stats))
            })
            .collect();
        tracing::debug!(
            watchers = channel.len(),
            devtools = self.config.devtools_enabled,
            "Compiled sagas"
        );

        let mut chain: Vec<Arc<dyn Middleware<S>>> = Vec::with_capacity(middlewares.len() + 2);
        if self.config.devtools_enabled {
            chain.push(Arc::new(DevToolsLogger));
        }
        chain.extend(middlewares);
        chain.push(Arc::new(SagaMiddleware::new(channel)));

        let store = Store::from_parts(Arc::new(reducer), initial_state, chain, stats);
        runtime.spawn(run_all(watchers, store.downgrade(), self.config.observer));
        Ok(store)
    }
}

impl<S: Send + Sync + 'static> Default for StoreManager<S> {
    fn default() -> Self {
        Self::new()
    }
}
