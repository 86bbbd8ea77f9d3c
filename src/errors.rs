//! Error types for handler execution, saga instances and the store

use crate::ActionType;
use std::any::Any;

/// Failure of a handler's async function.
///
/// Always recovered inside the pipeline: it is handed to the error
/// callback and turned into the configured error target actions.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The async function reported a failure
    #[error("{reason}")]
    Failed {
        /// Error description
        reason: Box<str>,
    },
    /// The async function (or its selector) panicked
    #[error("handler panicked: {message}")]
    Panicked {
        /// Panic message, if it was a string
        message: Box<str>,
    },
    /// Any other error raised by user code
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a failure from a description
    pub fn failed(reason: impl Into<Box<str>>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error
    pub fn other(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(error))
    }

    /// Check if this error came from a caught panic
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            message: panic_message(payload),
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> Box<str> {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).into()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str().into()
    } else {
        "non-string panic payload".into()
    }
}

/// Failure raised by a validate callback or an error callback
#[derive(Clone, Debug, thiserror::Error)]
#[error("{reason}")]
pub struct CallbackError {
    /// Error description
    pub reason: Box<str>,
}

impl CallbackError {
    /// Create a callback error
    pub fn new(reason: impl Into<Box<str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Error that terminates a single chain-execution instance.
///
/// Other instances, including ones for the same action, keep running.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The validate callback of a handler failed
    #[error("validate callback for `{action}` failed: {source}")]
    Validation {
        /// Watched action of the failing chain
        action: ActionType,
        /// Callback failure
        #[source]
        source: CallbackError,
    },
    /// The error callback of a handler failed
    #[error("error callback for `{action}` failed: {source}")]
    ErrorCallback {
        /// Watched action of the failing chain
        action: ActionType,
        /// Callback failure
        #[source]
        source: CallbackError,
    },
    /// A custom saga gave up
    #[error("saga `{action}` failed: {reason}")]
    Saga {
        /// Watched action of the failing saga
        action: ActionType,
        /// Error description
        reason: Box<str>,
    },
    /// The routine panicked outside of a handler's async function, e.g. in
    /// a validate callback, a lifecycle hook or a custom saga
    #[error("saga `{action}` panicked: {message}")]
    Panicked {
        /// Watched action of the panicking routine
        action: ActionType,
        /// Panic message, if it was a string
        message: Box<str>,
    },
    /// Dispatching a follow-up action failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExecutionError {
    /// Create a failure for a custom saga
    pub fn saga(action: impl Into<ActionType>, reason: impl Into<Box<str>>) -> Self {
        Self::Saga {
            action: action.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn from_panic(action: ActionType, payload: Box<dyn Any + Send>) -> Self {
        Self::Panicked {
            action,
            message: panic_message(payload),
        }
    }
}

/// Error from the state store
#[derive(Clone, Debug, thiserror::Error)]
pub enum StoreError {
    /// A reducer panicked during an earlier dispatch
    #[error("store poisoned: {reason}")]
    Poisoned {
        /// Error description
        reason: Box<str>,
    },
    /// A middleware dispatched while the store was reducing on the same thread
    #[error("`{action}` dispatched from inside middleware")]
    Reentrant {
        /// The rejected action
        action: ActionType,
    },
}

/// Error while starting the saga runtime
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// `create_store` was called outside of a tokio runtime
    #[error("no tokio runtime available to run sagas on")]
    NoRuntime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payloads() {
        let err = HandlerError::from_panic(Box::new("boom"));
        assert!(err.is_panic());
        assert_eq!(err.to_string(), "handler panicked: boom");

        let err = HandlerError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "handler panicked: owned");

        let err = HandlerError::from_panic(Box::new(42_u32));
        assert_eq!(err.to_string(), "handler panicked: non-string panic payload");
    }

    #[test]
    fn test_execution_error_display() {
        let err = ExecutionError::Validation {
            action: "FETCH".into(),
            source: CallbackError::new("bad shape"),
        };
        assert_eq!(err.to_string(), "validate callback for `FETCH` failed: bad shape");

        let err = ExecutionError::from_panic("FETCH".into(), Box::new("hook exploded"));
        assert_eq!(err.to_string(), "saga `FETCH` panicked: hook exploded");
    }
}
