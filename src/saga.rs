//! The routine run for each occurrence of a watched action

use crate::{Action, Effects, ExecutionError};
use async_trait::async_trait;
use std::future::Future;

/// A routine executed once per occurrence of its watched action.
///
/// Auto-compiled handler chains implement this trait; so can custom
/// routines registered with
/// [`SagaRegistry::register_custom`](crate::SagaRegistry::register_custom).
///
/// # Example
///
/// ```rust,ignore
/// struct Refresh;
///
/// #[async_trait]
/// impl Saga<AppState> for Refresh {
///     async fn run(
///         &self,
///         effects: Effects<AppState>,
///         _action: Action,
///     ) -> Result<(), ExecutionError> {
///         let stale = effects.select(|state| state.stale);
///         if stale {
///             effects.put(Action::new("RELOAD"))?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Saga<S>: Send + Sync + 'static {
    /// Run to completion for one action occurrence
    async fn run(&self, effects: Effects<S>, action: Action) -> Result<(), ExecutionError>;
}

/// Adapter turning an async closure into a [`Saga`]
pub struct FnSaga<F>(F);

/// Wrap an async closure as a custom saga
pub fn saga_fn<S, F, Fut>(routine: F) -> FnSaga<F>
where
    S: Send + Sync + 'static,
    F: Fn(Effects<S>, Action) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static,
{
    FnSaga(routine)
}

#[async_trait]
impl<S, F, Fut> Saga<S> for FnSaga<F>
where
    S: Send + Sync + 'static,
    F: Fn(Effects<S>, Action) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static,
{
    async fn run(&self, effects: Effects<S>, action: Action) -> Result<(), ExecutionError> {
        (self.0)(effects, action).await
    }
}
