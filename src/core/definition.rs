//! Typed definitions for state types, states and events.
//!
//! Definitions are plain values. They are collected by the
//! [`RegistryBuilder`](crate::registry::RegistryBuilder) during the
//! configuration phase and become immutable once the registry is frozen.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named axis of status tracked per entity, e.g. a fulfillment state.
///
/// # Example
///
/// ```rust
/// use entity_state::core::StateType;
///
/// let fulfillment = StateType::new("fulfillment_state", "Fulfillment state")
///     .with_description("The current state of the checkout process.")
///     .for_entity_kind("commerce_order")
///     .with_initial_state("unfulfilled");
///
/// assert!(fulfillment.applies_to("commerce_order"));
/// assert!(!fulfillment.applies_to("user"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateType {
    /// Unique key of the type
    pub key: String,
    /// Label key, translated by the caller
    pub label: String,
    /// Description key, translated by the caller
    #[serde(default)]
    pub description: String,
    /// Entity kinds this type is tracked for. Empty means every kind.
    #[serde(default, rename = "entity_types")]
    pub entity_kinds: BTreeSet<String>,
    /// State assigned to entities that have no record yet.
    /// Falls back to the first registered state when absent.
    #[serde(default)]
    pub initial_state: Option<String>,
}

impl StateType {
    /// Create a type with no description, entity kind restriction or
    /// explicit initial state.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: String::new(),
            entity_kinds: BTreeSet::new(),
            initial_state: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict the type to an entity kind. May be called repeatedly.
    pub fn for_entity_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kinds.insert(kind.into());
        self
    }

    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Check whether entities of `kind` can carry this type.
    pub fn applies_to(&self, kind: &str) -> bool {
        self.entity_kinds.is_empty() || self.entity_kinds.contains(kind)
    }
}

/// One valid value within a state type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    pub type_key: String,
    pub key: String,
    pub label: String,
}

impl StateDef {
    pub fn new(
        type_key: impl Into<String>,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            type_key: type_key.into(),
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A named transition from a set of permitted origin states to one target.
///
/// An empty origin set permits firing from any state.
///
/// # Example
///
/// ```rust
/// use entity_state::core::EventDef;
///
/// let event = EventDef::new("fulfillment_state", "to_fulfilled", "To Fulfilled", "fulfilled")
///     .with_origin("partially_fulfilled");
///
/// assert!(event.permits("partially_fulfilled"));
/// assert!(!event.permits("unfulfilled"));
///
/// let reset = EventDef::new("fulfillment_state", "reset", "Reset", "unfulfilled");
/// assert!(reset.permits("fulfilled"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    pub type_key: String,
    pub key: String,
    pub label: String,
    #[serde(rename = "target")]
    pub target_state: String,
    #[serde(rename = "origin", default)]
    pub origin_states: BTreeSet<String>,
}

impl EventDef {
    pub fn new(
        type_key: impl Into<String>,
        key: impl Into<String>,
        label: impl Into<String>,
        target_state: impl Into<String>,
    ) -> Self {
        Self {
            type_key: type_key.into(),
            key: key.into(),
            label: label.into(),
            target_state: target_state.into(),
            origin_states: BTreeSet::new(),
        }
    }

    /// Add a permitted origin state.
    pub fn with_origin(mut self, state: impl Into<String>) -> Self {
        self.origin_states.insert(state.into());
        self
    }

    /// Add several permitted origin states.
    pub fn with_origins<I, T>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.origin_states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Check whether the event may fire from `current` (pure).
    pub fn permits(&self, current: &str) -> bool {
        self.origin_states.is_empty() || self.origin_states.contains(current)
    }
}
