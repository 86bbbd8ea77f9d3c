//! Execution observer trait

use crate::{Action, ExecutionContext, ExecutionError, HandlerError};

/// Observer trait for external observability.
///
/// `handler` is the index of the handler within its chain.
pub trait ExecutionObserver: Send + Sync + 'static {
    /// A chain or custom saga instance was spawned
    fn on_execution_started(&self, context: &ExecutionContext);

    /// A handler is about to run
    fn on_handler_started(&self, context: &ExecutionContext, handler: usize);

    /// A handler's async function succeeded and its result was validated
    fn on_handler_completed(
        &self,
        context: &ExecutionContext,
        handler: usize,
        valid: bool,
        duration_millis: u64,
    );

    /// A handler's async function failed or panicked
    fn on_handler_failed(&self, context: &ExecutionContext, handler: usize, error: &HandlerError);

    /// The instance dispatched a follow-up action
    fn on_action_emitted(&self, context: &ExecutionContext, action: &Action);

    /// The instance ran to completion
    fn on_execution_completed(&self, context: &ExecutionContext);

    /// The instance ended early
    fn on_execution_failed(&self, context: &ExecutionContext, error: &ExecutionError);
}

/// No-op observer
pub struct NoOpObserver;

impl ExecutionObserver for NoOpObserver {
    fn on_execution_started(&self, _context: &ExecutionContext) {}
    fn on_handler_started(&self, _context: &ExecutionContext, _handler: usize) {}
    fn on_handler_completed(
        &self,
        _context: &ExecutionContext,
        _handler: usize,
        _valid: bool,
        _duration_millis: u64,
    ) {
    }
    fn on_handler_failed(&self, _: &ExecutionContext, _handler: usize, _error: &HandlerError) {}
    fn on_action_emitted(&self, _context: &ExecutionContext, _action: &Action) {}
    fn on_execution_completed(&self, _context: &ExecutionContext) {}
    fn on_execution_failed(&self, _context: &ExecutionContext, _error: &ExecutionError) {}
}

/// Tracing-based observer
pub struct TracingObserver;

impl ExecutionObserver for TracingObserver {
    fn on_execution_started(&self, context: &ExecutionContext) {
        tracing::debug!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            "Execution started"
        );
    }

    fn on_handler_started(&self, context: &ExecutionContext, handler: usize) {
        tracing::trace!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            handler,
            "Handler started"
        );
    }

    fn on_handler_completed(
        &self,
        context: &ExecutionContext,
        handler: usize,
        valid: bool,
        duration_millis: u64,
    ) {
        tracing::debug!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            handler,
            valid,
            duration_ms = duration_millis,
            "Handler completed"
        );
    }

    fn on_handler_failed(&self, context: &ExecutionContext, handler: usize, error: &HandlerError) {
        tracing::warn!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            handler,
            error = %error,
            "Handler failed"
        );
    }

    fn on_action_emitted(&self, context: &ExecutionContext, action: &Action) {
        tracing::trace!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            emitted = %action.kind,
            "Action emitted"
        );
    }

    fn on_execution_completed(&self, context: &ExecutionContext) {
        tracing::debug!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            elapsed_ms = context.elapsed_millis(),
            "Execution completed"
        );
    }

    fn on_execution_failed(&self, context: &ExecutionContext, error: &ExecutionError) {
        tracing::error!(
            execution_id = %context.execution_id,
            action = %context.action_type,
            error = %error,
            "Execution failed"
        );
    }
}
