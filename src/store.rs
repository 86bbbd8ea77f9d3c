//! Unidirectional state store

use crate::{Action, Middleware, RuntimeStats, RuntimeStatsSnapshot, StoreError};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

thread_local! {
    /// Stores currently reducing on this thread
    static REDUCING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a store as reducing on the current thread until dropped
struct ReduceScope {
    key: usize,
}

impl ReduceScope {
    /// `None` if the store is already reducing on this thread
    fn enter(key: usize) -> Option<Self> {
        REDUCING.with(|reducing| {
            let mut reducing = reducing.borrow_mut();
            if reducing.contains(&key) {
                return None;
            }
            reducing.push(key);
            Some(Self { key })
        })
    }
}

impl Drop for ReduceScope {
    fn drop(&mut self) {
        REDUCING.with(|reducing| reducing.borrow_mut().retain(|key| *key != self.key));
    }
}

/// Pure reducer: computes the next state from the current one
pub type Reducer<S> = Arc<dyn Fn(&S, &Action) -> S + Send + Sync>;

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Handle returned by [`Store::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared, dispatchable state store.
///
/// Cloning is cheap; all clones address the same state.
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

struct StoreInner<S> {
    state: RwLock<Arc<S>>,
    reducer: Reducer<S>,
    reduce_lock: Mutex<()>,
    middlewares: Vec<Arc<dyn Middleware<S>>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener<S>)>>,
    next_listener: AtomicU64,
    stats: Arc<RuntimeStats>,
}

impl<S: Send + Sync + 'static> Store<S> {
    /// Create a plain store without middleware
    pub fn new<R>(reducer: R, initial_state: S) -> Self
    where
        R: Fn(&S, &Action) -> S + Send + Sync + 'static,
    {
        Self::from_parts(
            Arc::new(reducer),
            initial_state,
            Vec::new(),
            Arc::new(RuntimeStats::new()),
        )
    }

    pub(crate) fn from_parts(
        reducer: Reducer<S>,
        initial_state: S,
        middlewares: Vec<Arc<dyn Middleware<S>>>,
        stats: Arc<RuntimeStats>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Arc::new(initial_state)),
                reducer,
                reduce_lock: Mutex::new(()),
                middlewares,
                listeners: RwLock::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                stats,
            }),
        }
    }

    /// Reduce `action` into the state, run middleware, then notify subscribers.
    ///
    /// Reductions are serialized. Subscribers run outside the store locks and
    /// may dispatch themselves. A dispatch from inside a middleware of the
    /// same store fails with [`StoreError::Reentrant`].
    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let next = {
            let key = Arc::as_ptr(&self.inner) as *const () as usize;
            let Some(_scope) = ReduceScope::enter(key) else {
                return Err(StoreError::Reentrant { action: action.kind });
            };
            let _guard = self
                .inner
                .reduce_lock
                .lock()
                .map_err(|e| StoreError::Poisoned {
                    reason: e.to_string().into(),
                })?;
            let current = self.state();
            let next = Arc::new((self.inner.reducer)(&*current, &action));
            *self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);
            self.inner
                .stats
                .actions_dispatched
                .fetch_add(1, Ordering::Relaxed);
            for middleware in &self.inner.middlewares {
                middleware.on_dispatch(&action, &*next);
            }
            next
        };

        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&*next);
        }
        Ok(())
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.inner.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Evaluate `selector` against the current state
    pub fn select<T>(&self, selector: impl FnOnce(&S) -> T) -> T {
        selector(&*self.state())
    }

    /// Register a listener notified after every dispatch
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        let listener: Listener<S> = Arc::new(listener);
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Remove a listener; returns false if it was already removed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Wait until no saga execution is queued or running
    pub async fn settled(&self) {
        self.inner.stats.settled().await
    }

    /// Saga runtime statistics
    pub fn stats(&self) -> RuntimeStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub(crate) fn runtime_stats(&self) -> Arc<RuntimeStats> {
        Arc::clone(&self.inner.stats)
    }

    pub(crate) fn downgrade(&self) -> WeakStore<S> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("middlewares", &self.inner.middlewares.len())
            .finish()
    }
}

/// Non-owning store handle held by watchers
pub(crate) struct WeakStore<S> {
    inner: Weak<StoreInner<S>>,
}

impl<S> WeakStore<S> {
    pub(crate) fn upgrade(&self) -> Option<Store<S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<S> Clone for WeakStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
