//! Frozen registry of events, grouped and ordered per type.

use crate::core::EventDef;
use crate::registry::error::{
    combine, ensure, qualified, DefinitionCheck, DefinitionError, DefinitionKind,
};
use crate::registry::states::StateMap;
use crate::registry::types::TypeMap;
use std::collections::{BTreeMap, HashSet};

/// Mapping of type key to its ordered events, as seen by alter mutators.
pub type EventMap = BTreeMap<String, Vec<EventDef>>;

/// Read-only view over the events of every type.
#[derive(Clone, Debug, Default)]
pub struct EventRegistry {
    events: EventMap,
}

impl EventRegistry {
    pub(crate) fn new(events: EventMap) -> Self {
        Self { events }
    }

    pub fn get_event(&self, type_key: &str, event_key: &str) -> Option<&EventDef> {
        self.events_for(type_key)
            .iter()
            .find(|event| event.key == event_key)
    }

    /// Events of a type in registration order. Empty for unknown types.
    pub fn events_for(&self, type_key: &str) -> &[EventDef] {
        self.events.get(type_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events that may fire from `current_state`.
    pub fn available_events<'a, 's>(
        &'a self,
        type_key: &str,
        current_state: &'s str,
    ) -> impl Iterator<Item = &'a EventDef> + 's
    where
        'a: 's,
    {
        self.events_for(type_key)
            .iter()
            .filter(move |event| event.permits(current_state))
    }

    /// Check whether any event of the type leaves `state_key`.
    ///
    /// Events with an empty origin set leave every state.
    pub fn has_outgoing(&self, type_key: &str, state_key: &str) -> bool {
        self.events_for(type_key)
            .iter()
            .any(|event| event.permits(state_key))
    }
}

/// Check the altered event mapping against the altered states and types.
///
/// Target and origin states must be registered for the same type.
pub(crate) fn validate_events(
    events: &EventMap,
    states: &StateMap,
    types: &TypeMap,
) -> DefinitionCheck {
    let mut checks = Vec::new();

    for (type_key, list) in events {
        checks.push(ensure(types.contains_key(type_key), || {
            DefinitionError::UnknownType {
                kind: DefinitionKind::Event,
                type_key: type_key.clone(),
            }
        }));

        let known: HashSet<&str> = states
            .get(type_key)
            .map(|list| list.iter().map(|s| s.key.as_str()).collect())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        for event in list {
            checks.push(ensure(event.type_key == *type_key, || {
                DefinitionError::KeyMismatch {
                    kind: DefinitionKind::Event,
                    expected: type_key.clone(),
                    found: event.type_key.clone(),
                }
            }));
            checks.push(ensure(seen.insert(event.key.as_str()), || {
                DefinitionError::DuplicateKey {
                    kind: DefinitionKind::Event,
                    key: qualified(type_key, &event.key),
                }
            }));
            checks.push(ensure(known.contains(event.target_state.as_str()), || {
                DefinitionError::UnknownTargetState {
                    type_key: type_key.clone(),
                    event_key: event.key.clone(),
                    state: event.target_state.clone(),
                }
            }));
            for origin in &event.origin_states {
                checks.push(ensure(known.contains(origin.as_str()), || {
                    DefinitionError::UnknownOriginState {
                        type_key: type_key.clone(),
                        event_key: event.key.clone(),
                        state: origin.clone(),
                    }
                }));
            }
        }
    }

    combine(checks)
}
