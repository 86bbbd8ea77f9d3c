//! Handler descriptors: one asynchronous step attached to an action

use crate::{Action, ActionType, CallbackError, ErrorTarget, HandlerError};
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Boxed async function of a handler
pub type AsyncFn =
    Arc<dyn Fn(HandlerInput) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// Maps a successful result to a validation outcome
pub type ValidateFn = Arc<dyn Fn(Value) -> Result<Validation, CallbackError> + Send + Sync>;

/// Extracts handler input from the current state
pub type SelectorFn<S> = Arc<dyn Fn(&S) -> Value + Send + Sync>;

/// Invoked with the error when the async function fails
pub type ErrCallbackFn =
    Arc<dyn Fn(HandlerError) -> BoxFuture<'static, Result<(), CallbackError>> + Send + Sync>;

/// Input handed to a handler's async function
#[derive(Clone, Debug)]
pub struct HandlerInput {
    /// Selector output, present only when the handler has a selector
    pub selected: Option<Value>,
    /// The triggering action
    pub action: Action,
}

impl HandlerInput {
    /// Selector output, if the handler has a selector
    pub fn selected(&self) -> Option<&Value> {
        self.selected.as_ref()
    }

    /// The triggering action
    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Outcome of a validate callback
#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    /// Selects the valid or the invalid branch
    pub valid: bool,
    /// Payload for the emitted target
    pub data: Value,
}

impl Validation {
    /// Valid outcome carrying `data`
    pub fn valid(data: Value) -> Self {
        Self { valid: true, data }
    }

    /// Invalid outcome carrying `data`
    pub fn invalid(data: Value) -> Self {
        Self { valid: false, data }
    }
}

/// Describes one asynchronous step reacting to an action.
///
/// Built with the builder methods below, then handed to
/// [`SagaRegistry::register`](crate::SagaRegistry::register), after which it
/// is never modified.
///
/// ```rust,ignore
/// let fetch = HandlerDescriptor::new("FETCH_VALUE", |_input| async {
///     Ok(json!("GoodValue"))
/// })
/// .valid_target("RECEIVE_VALUE")
/// .err_target("FETCH_FAILED");
/// ```
pub struct HandlerDescriptor<S> {
    action: ActionType,
    async_fn: AsyncFn,
    validate: ValidateFn,
    selector: Option<SelectorFn<S>>,
    err_callback: Option<ErrCallbackFn>,
    valid_target: Option<ActionType>,
    invalid_target: Option<ActionType>,
    err_target: ErrorTarget,
}

impl<S: Send + Sync + 'static> HandlerDescriptor<S> {
    /// Create a descriptor with the default validation (always valid)
    pub fn new<F, Fut>(action: impl Into<ActionType>, async_fn: F) -> Self
    where
        F: Fn(HandlerInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let async_fn: AsyncFn = Arc::new(move |input| async_fn(input).boxed());
        let validate: ValidateFn = Arc::new(|data| Ok(Validation::valid(data)));
        Self {
            action: action.into(),
            async_fn,
            validate,
            selector: None,
            err_callback: None,
            valid_target: None,
            invalid_target: None,
            err_target: ErrorTarget::None,
        }
    }

    /// Replace the validate callback
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(Value) -> Result<Validation, CallbackError> + Send + Sync + 'static,
    {
        let validate: ValidateFn = Arc::new(validate);
        self.validate = validate;
        self
    }

    /// Derive the handler input from the current state
    pub fn selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&S) -> Value + Send + Sync + 'static,
    {
        let selector: SelectorFn<S> = Arc::new(selector);
        self.selector = Some(selector);
        self
    }

    /// Callback awaited before error targets are emitted
    pub fn on_error<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(HandlerError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
    {
        let callback: ErrCallbackFn = Arc::new(move |error| callback(error).boxed());
        self.err_callback = Some(callback);
        self
    }

    /// Action emitted with the validated data on a valid result
    pub fn valid_target(mut self, target: impl Into<ActionType>) -> Self {
        self.valid_target = Some(target.into());
        self
    }

    /// Action emitted with the validated data on an invalid result
    pub fn invalid_target(mut self, target: impl Into<ActionType>) -> Self {
        self.invalid_target = Some(target.into());
        self
    }

    /// Action(s) emitted when the async function fails
    pub fn err_target(mut self, target: impl Into<ErrorTarget>) -> Self {
        self.err_target = target.into();
        self
    }
}

impl<S> HandlerDescriptor<S> {
    /// The action this handler reacts to
    pub fn action(&self) -> &ActionType {
        &self.action
    }

    pub(crate) fn async_fn(&self) -> &AsyncFn {
        &self.async_fn
    }

    pub(crate) fn validate_fn(&self) -> &ValidateFn {
        &self.validate
    }

    pub(crate) fn selector_fn(&self) -> Option<&SelectorFn<S>> {
        self.selector.as_ref()
    }

    pub(crate) fn err_callback(&self) -> Option<&ErrCallbackFn> {
        self.err_callback.as_ref()
    }

    /// Valid-branch target, ignoring empty identifiers
    pub fn valid_branch(&self) -> Option<&ActionType> {
        self.valid_target.as_ref().filter(|t| !t.is_empty())
    }

    /// Invalid-branch target, ignoring empty identifiers
    pub fn invalid_branch(&self) -> Option<&ActionType> {
        self.invalid_target.as_ref().filter(|t| !t.is_empty())
    }

    /// Error target
    pub fn error_target(&self) -> &ErrorTarget {
        &self.err_target
    }
}

impl<S> Clone for HandlerDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            async_fn: Arc::clone(&self.async_fn),
            validate: Arc::clone(&self.validate),
            selector: self.selector.clone(),
            err_callback: self.err_callback.clone(),
            valid_target: self.valid_target.clone(),
            invalid_target: self.invalid_target.clone(),
            err_target: self.err_target.clone(),
        }
    }
}

impl<S> std::fmt::Debug for HandlerDescriptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("action", &self.action)
            .field("has_selector", &self.selector.is_some())
            .field("has_err_callback", &self.err_callback.is_some())
            .field("valid_target", &self.valid_target)
            .field("invalid_target", &self.invalid_target)
            .field("err_target", &self.err_target)
            .finish()
    }
}
