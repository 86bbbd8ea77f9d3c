mod common;

use common::*;
use saga_store::{
    async_trait, Action, Effects, ExecutionError, HandlerDescriptor, HandlerError, HandlerInput,
    Saga, StoreManager,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn sleep_then_echo(input: HandlerInput) -> Result<Value, HandlerError> {
    let payload = input.action().payload().cloned().unwrap_or(Value::Null);
    let millis = payload["ms"].as_u64().unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Ok(payload["id"].clone())
}

fn kinds_and_payloads(journal: &saga_store::ActionJournal) -> Vec<(String, Value)> {
    journal
        .actions()
        .into_iter()
        .map(|a| (a.kind.to_string(), a.payload.unwrap_or(Value::Null)))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_handlers_run_in_registration_order() {
    init_tracing();
    let mut manager = StoreManager::new();
    manager
        .add_async_func(
            HandlerDescriptor::new("STEP", |_input| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(json!(1))
            })
            .valid_target("FIRST"),
        )
        .add_async_func(
            HandlerDescriptor::new("STEP", |_input| async { Ok(json!(2)) })
                .valid_target("SECOND"),
        );
    let (journal, middlewares) = journal();
    let store = manager.create_store(reducer, TestState::default(), middlewares).unwrap();

    store.dispatch(Action::new("STEP")).unwrap();
    settle(&store).await;

    assert_eq!(
        journal.actions(),
        vec![
            Action::new("STEP"),
            Action::with_payload("FIRST", json!(1)),
            Action::with_payload("SECOND", json!(2)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_action_runs_independent_instances() {
    init_tracing();
    let mut manager = StoreManager::new();
    manager
        .add_async_func(HandlerDescriptor::new("JOB", sleep_then_echo).valid_target("JOB_STARTED"))
        .add_async_func(HandlerDescriptor::new("JOB", sleep_then_echo).valid_target("JOB_DONE"));
    let (journal, middlewares) = journal();
    let store = manager.create_store(reducer, TestState::default(), middlewares).unwrap();

    store.dispatch(Action::with_payload("JOB", json!({"id": "slow", "ms": 50}))).unwrap();
    store.dispatch(Action::with_payload("JOB", json!({"id": "fast", "ms": 10}))).unwrap();
    settle(&store).await;

    let emitted: Vec<(String, Value)> = kinds_and_payloads(&journal)
        .into_iter()
        .filter(|(kind, _)| kind != "JOB")
        .collect();
    assert_eq!(
        emitted,
        vec![
            ("JOB_STARTED".to_string(), json!("fast")),
            ("JOB_DONE".to_string(), json!("fast")),
            ("JOB_STARTED".to_string(), json!("slow")),
            ("JOB_DONE".to_string(), json!("slow")),
        ]
    );
    let stats = store.stats();
    assert_eq!(stats.executions_started, 2);
    assert_eq!(stats.executions_completed, 2);
}

#[tokio::test(start_paused = true)]
async fn test_interleaved_instances_keep_their_own_order() {
    init_tracing();
    let mut manager = StoreManager::new();
    manager
        .add_async_func(HandlerDescriptor::new("JOB", sleep_then_echo).valid_target("A"))
        .add_async_func(HandlerDescriptor::new("JOB", sleep_then_echo).valid_target("B"))
        .add_async_func(HandlerDescriptor::new("JOB", sleep_then_echo).valid_target("C"));
    let (journal, middlewares) = journal();
    let store = manager.create_store(reducer, TestState::default(), middlewares).unwrap();

    for (id, ms) in [("x", 7), ("y", 11), ("z", 3)] {
        store.dispatch(Action::with_payload("JOB", json!({"id": id, "ms": ms}))).unwrap();
    }
    settle(&store).await;

    let entries = kinds_and_payloads(&journal);
    for id in ["x", "y", "z"] {
        let steps: Vec<&str> = entries
            .iter()
            .filter(|(kind, payload)| kind != "JOB" && *payload == json!(id))
            .map(|(kind, _)| kind.as_str())
            .collect();
        assert_eq!(steps, vec!["A", "B", "C"], "instance {id}");
    }
}

#[tokio::test]
async fn test_failing_handler_does_not_stop_chain() {
    init_tracing();
    let mut manager = StoreManager::new();
    manager
        .add_async_func(
            HandlerDescriptor::new(FETCH_VALUE, |_input| fetch_exception())
                .err_target(FETCH_FAILED),
        )
        .add_async_func(
            HandlerDescriptor::new(FETCH_VALUE, |_input| fetch_good_value())
                .valid_target(RECEIVE_VALUE),
        );
    let (journal, middlewares) = journal();
    let store = manager.create_store(reducer, TestState::default(), middlewares).unwrap();

    store.dispatch(Action::new(FETCH_VALUE)).unwrap();
    settle(&store).await;

    let kinds: Vec<String> = journal.kinds().iter().map(|k| k.to_string()).collect();
    assert_eq!(kinds, vec![FETCH_VALUE, FETCH_FAILED, RECEIVE_VALUE]);
    assert_eq!(store.state().value, json!(VALUE_GOOD));
}

#[tokio::test(start_paused = true)]
async fn test_hung_instance_does_not_block_others() {
    init_tracing();
    let mut manager = StoreManager::new();
    manager
        .add_async_func(
            HandlerDescriptor::new("SLOW", |_input| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            })
            .valid_target("SLOW_DONE"),
        )
        .add_async_func(
            HandlerDescriptor::new(FETCH_VALUE, |_input| fetch_good_value())
                .valid_target(RECEIVE_VALUE),
        );
    let (journal, middlewares) = journal();
    let store = manager.create_store(reducer, TestState::default(), middlewares).unwrap();

    store.dispatch(Action::new("SLOW")).unwrap();
    store.dispatch(Action::new(FETCH_VALUE)).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(journal.count(RECEIVE_VALUE), 1);
    assert_eq!(journal.count("SLOW_DONE"), 0);
    assert_eq!(store.stats().pending_executions, 1);

    tokio::time::timeout(Duration::from_secs(7200), store.settled())
        .await
        .expect("slow instance finished");
    assert_eq!(journal.count("SLOW_DONE"), 1);
}

struct Tracked {
    _marker: Arc<()>,
}

#[async_trait]
impl Saga<TestState> for Tracked {
    async fn run(
        &self,
        effects: Effects<TestState>,
        _action: Action,
    ) -> Result<(), ExecutionError> {
        effects.put(Action::with_payload(RECEIVE_VALUE, json!(VALUE_GOOD)))?;
        Ok(())
    }
}

#[tokio::test]
async fn test_dropping_store_stops_watchers() {
    init_tracing();
    let marker = Arc::new(());
    let mut manager = StoreManager::new();
    manager.add_saga(
        FETCH_VALUE,
        Tracked {
            _marker: Arc::clone(&marker),
        },
    );
    let store = manager.create_store(reducer, TestState::default(), Vec::new()).unwrap();

    store.dispatch(Action::new(FETCH_VALUE)).unwrap();
    settle(&store).await;
    assert_eq!(store.state().value, json!(VALUE_GOOD));
    assert!(Arc::strong_count(&marker) > 1);

    drop(store);
    tokio::time::timeout(Duration::from_secs(5), async {
        while Arc::strong_count(&marker) > 1 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("watchers still hold the saga after the store was dropped");
    assert_eq!(Arc::strong_count(&marker), 1);
}
