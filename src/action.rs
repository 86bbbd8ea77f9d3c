//! Action and execution identity types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of an action (the `type` field of a dispatched action)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(Box<str>);

impl ActionType {
    /// Create a new action type
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self(name.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty identifier never names a target
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ActionType {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        Self(name.into_boxed_str())
    }
}

impl From<&ActionType> for ActionType {
    fn from(name: &ActionType) -> Self {
        name.clone()
    }
}

impl AsRef<str> for ActionType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ActionType {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ActionType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Debug for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActionType({})", self.0)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed event with an optional payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action identifier
    #[serde(rename = "type")]
    pub kind: ActionType,
    /// Optional payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Action {
    /// Create an action without payload
    pub fn new(kind: impl Into<ActionType>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Create an action carrying a payload
    pub fn with_payload(kind: impl Into<ActionType>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    /// Check the action identifier
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Payload, if any
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

/// Unique identifier for one chain-execution instance
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionId(pub u64);

impl ExecutionId {
    /// Allocate the next process-wide execution ID
    pub fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Debug for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExecutionId({})", self.0)
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context of one chain-execution instance
#[derive(Clone)]
pub struct ExecutionContext {
    /// Instance identifier
    pub execution_id: ExecutionId,
    /// The watched action that triggered this instance
    pub action_type: ActionType,
    /// When the instance was spawned (millis since UNIX epoch)
    pub started_at_millis: u64,
}

impl ExecutionContext {
    /// Create a context for a freshly spawned instance
    pub fn new(action_type: ActionType) -> Self {
        Self {
            execution_id: ExecutionId::next(),
            action_type,
            started_at_millis: Self::now_millis(),
        }
    }

    /// Get current time in milliseconds since UNIX epoch
    pub fn now_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Calculate elapsed time since the instance started
    pub fn elapsed_millis(&self) -> u64 {
        Self::now_millis().saturating_sub(self.started_at_millis)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("action_type", &self.action_type)
            .finish()
    }
}
