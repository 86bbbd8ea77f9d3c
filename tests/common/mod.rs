#![allow(dead_code)]

use saga_store::{Action, ActionJournal, Middleware, Store};
use serde_json::Value;
use std::sync::{Arc, Once};
use std::time::Duration;

pub const FETCH_VALUE: &str = "FETCH_VALUE";
pub const FETCH_OTHER: &str = "FETCH_OTHER";
pub const RECEIVE_VALUE: &str = "RECEIVE_VALUE";
pub const RECEIVE_OTHER: &str = "RECEIVE_OTHER";
pub const FETCH_FAILED: &str = "FETCH_FAILED";
pub const ACTION_NOOP: &str = "ACTION_NOOP";

pub const VALUE_NONE: &str = "None";
pub const VALUE_ERROR: &str = "Error!";
pub const VALUE_OTHER: &str = "OtherValue";
pub const VALUE_GOOD: &str = "GoodValue";
pub const VALUE_BAD: &str = "BadValue";

#[derive(Clone, Debug, PartialEq)]
pub struct TestState {
    pub value: Value,
    pub other: Value,
    pub last_action: String,
    pub actions: Vec<String>,
}

impl Default for TestState {
    fn default() -> Self {
        Self {
            value: Value::from(VALUE_NONE),
            other: Value::from(VALUE_NONE),
            last_action: VALUE_NONE.to_string(),
            actions: Vec::new(),
        }
    }
}

pub fn reducer(state: &TestState, action: &Action) -> TestState {
    let mut next = state.clone();
    let payload = action.payload().cloned().unwrap_or(Value::Null);
    match action.kind.as_str() {
        RECEIVE_VALUE => next.value = payload,
        RECEIVE_OTHER => next.other = payload,
        FETCH_VALUE | FETCH_OTHER | FETCH_FAILED | ACTION_NOOP => {}
        _ => return next,
    }
    next.last_action = action.kind.to_string();
    next.actions.push(action.kind.to_string());
    next
}

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn journal() -> (Arc<ActionJournal>, Vec<Arc<dyn Middleware<TestState>>>) {
    let journal = Arc::new(ActionJournal::new());
    let middleware: Arc<dyn Middleware<TestState>> = journal.clone();
    let middlewares = vec![middleware];
    (journal, middlewares)
}

pub async fn settle(store: &Store<TestState>) {
    tokio::time::timeout(Duration::from_secs(5), store.settled())
        .await
        .expect("sagas did not settle");
}

pub async fn fetch_good_value() -> Result<Value, saga_store::HandlerError> {
    Ok(Value::from(VALUE_GOOD))
}

pub async fn fetch_other_value() -> Result<Value, saga_store::HandlerError> {
    Ok(Value::from(VALUE_OTHER))
}

pub async fn fetch_bad_value() -> Result<Value, saga_store::HandlerError> {
    Ok(Value::from(VALUE_BAD))
}

pub async fn fetch_exception() -> Result<Value, saga_store::HandlerError> {
    Err(saga_store::HandlerError::failed(VALUE_ERROR))
}
