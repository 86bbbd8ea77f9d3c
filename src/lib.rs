//! Automatic Sagas over a Unidirectional State Store
//!
//! Register, per action, an ordered chain of async handlers. When the store is
//! created, each chain is compiled into a watcher that runs the whole chain for
//! every dispatched occurrence of its action and turns handler outcomes
//! (valid, invalid, error) into new actions dispatched back into the store.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! // 1. Describe the async steps
//! let mut manager = StoreManager::new();
//! manager.add_async_func(
//!     HandlerDescriptor::new("FETCH_VALUE", |_input| async { Ok(json!("GoodValue")) })
//!         .valid_target("RECEIVE_VALUE")
//!         .err_target("FETCH_FAILED"),
//! );
//!
//! // 2. Start the watchers on a store (inside a tokio runtime)
//! let store = manager.create_store(reducer, AppState::default(), Vec::new())?;
//!
//! // 3. Dispatch; RECEIVE_VALUE { payload: "GoodValue" } follows
//! store.dispatch(Action::new("FETCH_VALUE"))?;
//! ```

#![warn(missing_docs)]

// === Core Types ===
mod action;
mod errors;
mod targets;

// === Registration ===
mod descriptor;
mod hooks;
mod registry;
mod saga;

// === Execution ===
mod chain;
mod channel;
mod effects;
mod pipeline;
mod watch;

// === Store ===
mod journal;
mod manager;
mod middleware;
mod store;

// === Observability ===
mod observer;
mod stats;

// === Re-exports ===

// Types
pub use action::{Action, ActionType, ExecutionContext, ExecutionId};
pub use targets::{ErrorTarget, Target};

// Errors
pub use errors::{CallbackError, ConfigError, ExecutionError, HandlerError, StoreError};

// Registration
pub use descriptor::{
    AsyncFn, ErrCallbackFn, HandlerDescriptor, HandlerInput, SelectorFn, ValidateFn, Validation,
};
pub use hooks::{HookFn, LifecycleHooks};
pub use registry::SagaRegistry;
pub use saga::{saga_fn, FnSaga, Saga};

// Execution
pub use effects::Effects;

// Store
pub use journal::{ActionJournal, JournalEntry};
pub use manager::{StoreManager, StoreManagerConfig};
pub use middleware::{DevToolsLogger, Middleware};
pub use store::{Reducer, Store, SubscriptionId};

// Observability
pub use observer::{ExecutionObserver, NoOpObserver, TracingObserver};
pub use stats::{RuntimeStats, RuntimeStatsSnapshot};

// Re-export commonly used external types
pub use async_trait::async_trait;
