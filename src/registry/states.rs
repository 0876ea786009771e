//! Frozen registry of states, grouped and ordered per type.

use crate::core::StateDef;
use crate::registry::error::{
    combine, ensure, qualified, DefinitionCheck, DefinitionError, DefinitionKind, RegistryError,
};
use crate::registry::types::TypeMap;
use std::collections::{BTreeMap, HashSet};

/// Mapping of type key to its ordered states, as seen by alter mutators.
pub type StateMap = BTreeMap<String, Vec<StateDef>>;

/// Read-only view over the valid states of every type.
#[derive(Clone, Debug, Default)]
pub struct StateRegistry {
    states: StateMap,
    initial: BTreeMap<String, String>,
}

impl StateRegistry {
    /// Build from validated mappings. Each type's initial state is its
    /// configured one, or else its first state.
    pub(crate) fn new(states: StateMap, types: &TypeMap) -> Self {
        let initial = types
            .values()
            .filter_map(|state_type| {
                let initial = state_type.initial_state.clone().or_else(|| {
                    states
                        .get(&state_type.key)
                        .and_then(|list| list.first())
                        .map(|state| state.key.clone())
                })?;
                Some((state_type.key.clone(), initial))
            })
            .collect();

        Self { states, initial }
    }

    /// States of a type in registration order.
    pub fn get_states(&self, type_key: &str) -> Result<&[StateDef], RegistryError> {
        self.states
            .get(type_key)
            .map(Vec::as_slice)
            .ok_or_else(|| RegistryError::NotFound {
                kind: DefinitionKind::Type,
                key: type_key.to_string(),
            })
    }

    pub fn get_state(&self, type_key: &str, state_key: &str) -> Option<&StateDef> {
        self.states
            .get(type_key)?
            .iter()
            .find(|state| state.key == state_key)
    }

    pub fn is_valid_state(&self, type_key: &str, state_key: &str) -> bool {
        self.get_state(type_key, state_key).is_some()
    }

    /// State assigned to entities that have no record for this type yet.
    pub fn initial_state(&self, type_key: &str) -> Option<&str> {
        self.initial.get(type_key).map(String::as_str)
    }
}

/// Check the altered state mapping against the altered type mapping.
///
/// Every list must be filed under a registered type, hold states that agree
/// with that type and carry unique keys. Every type needs at least one state
/// and its configured initial state must exist.
pub(crate) fn validate_states(states: &StateMap, types: &TypeMap) -> DefinitionCheck {
    let mut checks = Vec::new();

    for (type_key, list) in states {
        checks.push(ensure(types.contains_key(type_key), || {
            DefinitionError::UnknownType {
                kind: DefinitionKind::State,
                type_key: type_key.clone(),
            }
        }));

        let mut seen = HashSet::new();
        for state in list {
            checks.push(ensure(state.type_key == *type_key, || {
                DefinitionError::KeyMismatch {
                    kind: DefinitionKind::State,
                    expected: type_key.clone(),
                    found: state.type_key.clone(),
                }
            }));
            checks.push(ensure(seen.insert(state.key.as_str()), || {
                DefinitionError::DuplicateKey {
                    kind: DefinitionKind::State,
                    key: qualified(type_key, &state.key),
                }
            }));
        }
    }

    for state_type in types.values() {
        let list = states.get(&state_type.key).map(Vec::as_slice).unwrap_or(&[]);
        checks.push(ensure(!list.is_empty(), || DefinitionError::NoStates {
            type_key: state_type.key.clone(),
        }));

        if let Some(initial) = &state_type.initial_state {
            checks.push(ensure(list.iter().any(|s| s.key == *initial), || {
                DefinitionError::UnknownInitialState {
                    type_key: state_type.key.clone(),
                    state: initial.clone(),
                }
            }));
        }
    }

    combine(checks)
}
