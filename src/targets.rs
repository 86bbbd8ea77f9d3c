//! Follow-up action targets

use crate::{Action, ActionType};
use serde_json::Value;

/// A single target: an action identifier, optionally with payload
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// Emit `{type}`
    Named(ActionType),
    /// Emit `{type, payload}`
    Payload(ActionType, Value),
}

impl Target {
    /// Target without payload
    pub fn named(kind: impl Into<ActionType>) -> Self {
        Self::Named(kind.into())
    }

    /// Target carrying `data` as payload
    pub fn payload(kind: impl Into<ActionType>, data: Value) -> Self {
        Self::Payload(kind.into(), data)
    }

    /// Resolve to an action; empty identifiers resolve to nothing
    pub fn to_action(&self) -> Option<Action> {
        match self {
            Self::Named(kind) if !kind.is_empty() => Some(Action::new(kind)),
            Self::Payload(kind, data) if !kind.is_empty() => {
                Some(Action::with_payload(kind, data.clone()))
            }
            _ => None,
        }
    }
}

impl From<&str> for Target {
    fn from(kind: &str) -> Self {
        Self::named(kind)
    }
}

impl From<(&str, Value)> for Target {
    fn from((kind, data): (&str, Value)) -> Self {
        Self::payload(kind, data)
    }
}

/// What to emit when a handler's async function fails
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ErrorTarget {
    /// Emit nothing
    #[default]
    None,
    /// Emit `{type}`
    Named(ActionType),
    /// Emit `{type, payload}`
    Payload(ActionType, Value),
    /// Emit each target in list order
    Sequence(Vec<Target>),
}

impl ErrorTarget {
    /// Resolve to the actions to emit, in emission order
    pub fn actions(&self) -> Vec<Action> {
        match self {
            Self::None => Vec::new(),
            Self::Named(kind) => Target::Named(kind.clone()).to_action().into_iter().collect(),
            Self::Payload(kind, data) => Target::Payload(kind.clone(), data.clone())
                .to_action()
                .into_iter()
                .collect(),
            Self::Sequence(targets) => targets.iter().filter_map(Target::to_action).collect(),
        }
    }

    /// Check if no error target is configured
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<&str> for ErrorTarget {
    fn from(kind: &str) -> Self {
        Self::Named(kind.into())
    }
}

impl From<(&str, Value)> for ErrorTarget {
    fn from((kind, data): (&str, Value)) -> Self {
        Self::Payload(kind.into(), data)
    }
}

impl From<Target> for ErrorTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Named(kind) => Self::Named(kind),
            Target::Payload(kind, data) => Self::Payload(kind, data),
        }
    }
}

impl From<Vec<Target>> for ErrorTarget {
    fn from(targets: Vec<Target>) -> Self {
        Self::Sequence(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_preserves_order() {
        let target: ErrorTarget =
            vec![Target::named("FAIL_A"), Target::payload("FAIL_B", json!("X"))].into();
        let actions = target.actions();
        assert_eq!(
            actions,
            vec![Action::new("FAIL_A"), Action::with_payload("FAIL_B", json!("X"))]
        );
    }

    #[test]
    fn test_empty_targets_emit_nothing() {
        assert!(ErrorTarget::None.actions().is_empty());
        assert!(ErrorTarget::from("").actions().is_empty());

        let mixed: ErrorTarget = vec![Target::named(""), Target::named("FAIL")].into();
        assert_eq!(mixed.actions(), vec![Action::new("FAIL")]);
    }

    #[test]
    fn test_payload_target() {
        let target = ErrorTarget::from(("FETCH_FAILED", json!({"code": 500})));
        assert_eq!(
            target.actions(),
            vec![Action::with_payload("FETCH_FAILED", json!({"code": 500}))]
        );
    }
}
