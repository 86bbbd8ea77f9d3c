//! Per-handler execution: select, invoke, validate, branch, recover

use crate::{
    Action, Effects, ExecutionError, HandlerDescriptor, HandlerError, HandlerInput, Validation,
};
use futures_util::FutureExt;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Instant;

/// Run one handler of a chain for one action occurrence.
///
/// Failures of the async function are recovered here and turned into the
/// handler's error targets. Only callback failures and store errors escape.
pub(crate) async fn run_handler<S>(
    handler: &HandlerDescriptor<S>,
    index: usize,
    effects: &Effects<S>,
    action: &Action,
) -> Result<(), ExecutionError>
where
    S: Send + Sync + 'static,
{
    let context = effects.context();
    effects.observer().on_handler_started(context, index);
    let started = Instant::now();

    match invoke(handler, effects, action).await {
        Ok(result) => {
            let Validation { valid, data } =
                (handler.validate_fn())(result).map_err(|source| ExecutionError::Validation {
                    action: context.action_type.clone(),
                    source,
                })?;
            let elapsed = started.elapsed().as_millis() as u64;
            effects.observer().on_handler_completed(context, index, valid, elapsed);

            let target = if valid {
                effects.stats().handlers_valid.fetch_add(1, Ordering::Relaxed);
                handler.valid_branch()
            } else {
                effects.stats().handlers_invalid.fetch_add(1, Ordering::Relaxed);
                handler.invalid_branch()
            };
            if let Some(target) = target {
                effects.put(Action::with_payload(target, data))?;
            }
        }
        Err(error) => {
            effects.stats().handlers_errored.fetch_add(1, Ordering::Relaxed);
            effects.observer().on_handler_failed(context, index, &error);

            if let Some(callback) = handler.err_callback() {
                callback(error)
                    .await
                    .map_err(|source| ExecutionError::ErrorCallback {
                        action: context.action_type.clone(),
                        source,
                    })?;
            }
            for follow_up in handler.error_target().actions() {
                effects.put(follow_up)?;
            }
        }
    }
    Ok(())
}

/// Evaluate the selector and await the async function, converting panics
/// (raised before or after the future is built) into handler errors.
async fn invoke<S>(
    handler: &HandlerDescriptor<S>,
    effects: &Effects<S>,
    action: &Action,
) -> Result<Value, HandlerError>
where
    S: Send + Sync + 'static,
{
    let started = panic::catch_unwind(AssertUnwindSafe(|| {
        let selected = handler
            .selector_fn()
            .map(|selector| effects.select(|state| selector(state)));
        (handler.async_fn())(HandlerInput {
            selected,
            action: action.clone(),
        })
    }));

    match started {
        Ok(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload))),
        Err(payload) => Err(HandlerError::from_panic(payload)),
    }
}
