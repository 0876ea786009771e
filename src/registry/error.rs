//! Registry errors for the configuration phase.

use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Which registry a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Type,
    State,
    Event,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => f.write_str("state type"),
            Self::State => f.write_str("state"),
            Self::Event => f.write_str("event"),
        }
    }
}

/// Errors raised while registering definitions or freezing the registry.
///
/// All of these are fatal: a registry that fails to freeze must halt boot.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate {kind} key '{key}'")]
    DuplicateKey { kind: DefinitionKind, key: String },

    #[error("Unknown {kind} '{key}'")]
    NotFound { kind: DefinitionKind, key: String },

    #[error("{kind} '{key}' belongs to type '{found}', expected '{expected}'")]
    TypeMismatch {
        kind: DefinitionKind,
        key: String,
        expected: String,
        found: String,
    },

    #[error("Registry has {} invalid definition(s): {}", .0.len(), join_errors(.0))]
    InvalidDefinitions(Vec<DefinitionError>),
}

/// A single problem found when validating the altered mappings at freeze.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("Event '{type_key}.{event_key}' targets unknown state '{state}'")]
    UnknownTargetState {
        type_key: String,
        event_key: String,
        state: String,
    },

    #[error("Event '{type_key}.{event_key}' lists unknown origin state '{state}'")]
    UnknownOriginState {
        type_key: String,
        event_key: String,
        state: String,
    },

    #[error("Type '{type_key}' declares unknown initial state '{state}'")]
    UnknownInitialState { type_key: String, state: String },

    #[error("Type '{type_key}' has no states")]
    NoStates { type_key: String },

    #[error("{kind} definitions filed under unregistered type '{type_key}'")]
    UnknownType {
        kind: DefinitionKind,
        type_key: String,
    },

    #[error("Duplicate {kind} key '{key}'")]
    DuplicateKey { kind: DefinitionKind, key: String },

    #[error("{kind} filed under '{expected}' declares key '{found}'")]
    KeyMismatch {
        kind: DefinitionKind,
        expected: String,
        found: String,
    },
}

/// Outcome of a freeze-time check. Accumulates every failure.
pub type DefinitionCheck = Validation<(), NonEmptyVec<DefinitionError>>;

/// Build a check from a condition, producing the error only on failure.
pub(crate) fn ensure<F>(condition: bool, error: F) -> DefinitionCheck
where
    F: FnOnce() -> DefinitionError,
{
    if condition {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

/// Fold a batch of checks into one, keeping all failures.
pub(crate) fn combine(checks: Vec<DefinitionCheck>) -> DefinitionCheck {
    Validation::all_vec(checks).map(|_| ())
}

pub(crate) fn qualified(type_key: &str, key: &str) -> String {
    format!("{type_key}.{key}")
}

fn join_errors(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
