//! Lifecycle hooks wrapping each auto-compiled chain execution

use crate::ActionType;
use std::sync::Arc;

/// Side-effecting hook receiving the watched action
pub type HookFn = Arc<dyn Fn(&ActionType) + Send + Sync>;

/// `on_before` runs once before the first handler of a chain instance,
/// `on_after` once after the last one.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    on_before: Option<HookFn>,
    on_after: Option<HookFn>,
}

impl LifecycleHooks {
    /// No hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook called before a chain runs
    pub fn on_before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActionType) + Send + Sync + 'static,
    {
        let hook: HookFn = Arc::new(hook);
        self.on_before = Some(hook);
        self
    }

    /// Set the hook called after a chain ran
    pub fn on_after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ActionType) + Send + Sync + 'static,
    {
        let hook: HookFn = Arc::new(hook);
        self.on_after = Some(hook);
        self
    }

    pub(crate) fn before(&self, action: &ActionType) {
        if let Some(hook) = &self.on_before {
            hook(action);
        }
    }

    pub(crate) fn after(&self, action: &ActionType) {
        if let Some(hook) = &self.on_after {
            hook(action);
        }
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("on_before", &self.on_before.is_some())
            .field("on_after", &self.on_after.is_some())
            .finish()
    }
}
