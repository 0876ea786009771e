//! Errors returned to callers of the transition executor.

use crate::executor::store::StoreError;
use thiserror::Error;

/// Errors that can occur while reading or changing an entity's state.
///
/// All of these are recoverable and surfaced to the immediate caller.
/// Observer failures never show up here.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Unknown state type '{type_key}'")]
    NotFound { type_key: String },

    #[error("State type '{type_key}' does not apply to entity kind '{entity_kind}'")]
    NotApplicable {
        type_key: String,
        entity_kind: String,
    },

    #[error("Unknown event '{event_key}' for state type '{type_key}'")]
    UnknownEvent { type_key: String, event_key: String },

    #[error("Event '{event_key}' cannot fire from state '{current_state}' of type '{type_key}'")]
    InvalidTransition {
        type_key: String,
        event_key: String,
        current_state: String,
    },

    #[error("'{state}' is not a valid state of type '{type_key}'")]
    InvalidState { type_key: String, state: String },

    #[error("Failed to persist entity state: {0}")]
    Persistence(#[from] StoreError),
}
