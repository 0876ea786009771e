//! Configuration-phase builder for the registry.

use crate::core::{EventDef, StateDef, StateType};
use crate::registry::error::{qualified, DefinitionKind, RegistryError};
use crate::registry::events::{validate_events, EventMap, EventRegistry};
use crate::registry::states::{validate_states, StateMap, StateRegistry};
use crate::registry::types::{validate_types, TypeMap, TypeRegistry};
use crate::registry::Registry;
use stillwater::validation::Validation;

/// Mutation callback applied to a mapping before the registry is frozen.
pub type Mutator<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Builder that collects definitions and alter mutators, then freezes
/// them into an immutable [`Registry`].
///
/// Registration rejects duplicate keys immediately. Mutators run at
/// [`freeze`](Self::freeze), each kind in registration order: types first,
/// then states, then events. The altered mappings are validated as a whole
/// and every problem is reported at once.
///
/// # Example
///
/// ```rust
/// use entity_state::core::{EventDef, StateDef, StateType};
/// use entity_state::registry::RegistryBuilder;
///
/// let registry = RegistryBuilder::new()
///     .register_type(StateType::new("review", "Review"))?
///     .register_states("review", vec![
///         StateDef::new("review", "draft", "Draft"),
///         StateDef::new("review", "published", "Published"),
///     ])?
///     .register_events("review", vec![
///         EventDef::new("review", "publish", "Publish", "published").with_origin("draft"),
///     ])?
///     .alter_states(|states| {
///         if let Some(list) = states.get_mut("review") {
///             list.push(StateDef::new("review", "archived", "Archived"));
///         }
///     })
///     .freeze()?;
///
/// assert!(registry.states().is_valid_state("review", "archived"));
/// # Ok::<(), entity_state::registry::RegistryError>(())
/// ```
pub struct RegistryBuilder {
    types: TypeMap,
    states: StateMap,
    events: EventMap,
    type_mutators: Vec<Mutator<TypeMap>>,
    state_mutators: Vec<Mutator<StateMap>>,
    event_mutators: Vec<Mutator<EventMap>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            types: TypeMap::new(),
            states: StateMap::new(),
            events: EventMap::new(),
            type_mutators: Vec::new(),
            state_mutators: Vec::new(),
            event_mutators: Vec::new(),
        }
    }

    /// Register a state type. Fails if the key is taken.
    pub fn register_type(mut self, state_type: StateType) -> Result<Self, RegistryError> {
        if self.types.contains_key(&state_type.key) {
            return Err(RegistryError::DuplicateKey {
                kind: DefinitionKind::Type,
                key: state_type.key,
            });
        }
        self.types.insert(state_type.key.clone(), state_type);
        Ok(self)
    }

    /// Append states to a registered type, keeping their order.
    pub fn register_states<I>(mut self, type_key: &str, states: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = StateDef>,
    {
        self.require_type(type_key)?;
        let list = self.states.entry(type_key.to_string()).or_default();

        for state in states {
            check_owner(DefinitionKind::State, type_key, &state.type_key, &state.key)?;
            if list.iter().any(|existing| existing.key == state.key) {
                return Err(RegistryError::DuplicateKey {
                    kind: DefinitionKind::State,
                    key: qualified(type_key, &state.key),
                });
            }
            list.push(state);
        }
        Ok(self)
    }

    /// Append events to a registered type, keeping their order.
    ///
    /// Target and origin states are checked at freeze, after every
    /// mutator has run.
    pub fn register_events<I>(mut self, type_key: &str, events: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = EventDef>,
    {
        self.require_type(type_key)?;
        let list = self.events.entry(type_key.to_string()).or_default();

        for event in events {
            check_owner(DefinitionKind::Event, type_key, &event.type_key, &event.key)?;
            if list.iter().any(|existing| existing.key == event.key) {
                return Err(RegistryError::DuplicateKey {
                    kind: DefinitionKind::Event,
                    key: qualified(type_key, &event.key),
                });
            }
            list.push(event);
        }
        Ok(self)
    }

    /// Queue a mutator over the full type mapping.
    pub fn alter_types<F>(mut self, mutator: F) -> Self
    where
        F: Fn(&mut TypeMap) + Send + Sync + 'static,
    {
        self.type_mutators.push(Box::new(mutator));
        self
    }

    /// Queue a mutator over the full state mapping.
    pub fn alter_states<F>(mut self, mutator: F) -> Self
    where
        F: Fn(&mut StateMap) + Send + Sync + 'static,
    {
        self.state_mutators.push(Box::new(mutator));
        self
    }

    /// Queue a mutator over the full event mapping.
    pub fn alter_events<F>(mut self, mutator: F) -> Self
    where
        F: Fn(&mut EventMap) + Send + Sync + 'static,
    {
        self.event_mutators.push(Box::new(mutator));
        self
    }

    /// Apply all mutators, validate, and freeze.
    ///
    /// Returns [`RegistryError::InvalidDefinitions`] carrying every problem
    /// found. This is a startup failure, not something to retry.
    pub fn freeze(self) -> Result<Registry, RegistryError> {
        let Self {
            mut types,
            mut states,
            mut events,
            type_mutators,
            state_mutators,
            event_mutators,
        } = self;

        for mutator in &type_mutators {
            mutator(&mut types);
        }
        for mutator in &state_mutators {
            mutator(&mut states);
        }
        for mutator in &event_mutators {
            mutator(&mut events);
        }

        let checks = vec![
            validate_types(&types),
            validate_states(&states, &types),
            validate_events(&events, &states, &types),
        ];

        if let Validation::Failure(errors) = Validation::all_vec(checks) {
            let errors: Vec<_> = errors.iter().cloned().collect();
            tracing::error!(
                error_count = errors.len(),
                "Registry definitions failed validation"
            );
            return Err(RegistryError::InvalidDefinitions(errors));
        }

        let state_count: usize = states.values().map(Vec::len).sum();
        let event_count: usize = events.values().map(Vec::len).sum();
        tracing::debug!(
            types = types.len(),
            states = state_count,
            events = event_count,
            mutators = type_mutators.len() + state_mutators.len() + event_mutators.len(),
            "Registry frozen"
        );

        let state_registry = StateRegistry::new(states, &types);
        Ok(Registry {
            types: TypeRegistry::new(types),
            states: state_registry,
            events: EventRegistry::new(events),
        })
    }

    fn require_type(&self, type_key: &str) -> Result<(), RegistryError> {
        if self.types.contains_key(type_key) {
            Ok(())
        } else {
            Err(RegistryError::NotFound {
                kind: DefinitionKind::Type,
                key: type_key.to_string(),
            })
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_owner(
    kind: DefinitionKind,
    expected: &str,
    found: &str,
    key: &str,
) -> Result<(), RegistryError> {
    if expected == found {
        Ok(())
    } else {
        Err(RegistryError::TypeMismatch {
            kind,
            key: key.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DefinitionError;

    fn fulfillment() -> RegistryBuilder {
        RegistryBuilder::new()
            .register_type(
                StateType::new("fulfillment_state", "Fulfillment state")
                    .for_entity_kind("commerce_order"),
            )
            .unwrap()
            .register_states(
                "fulfillment_state",
                vec![
                    StateDef::new("fulfillment_state", "unfulfilled", "Unfulfilled"),
                    StateDef::new(
                        "fulfillment_state",
                        "partially_fulfilled",
                        "Partially fulfilled",
                    ),
                    StateDef::new("fulfillment_state", "fulfilled", "Fulfilled"),
                ],
            )
            .unwrap()
            .register_events(
                "fulfillment_state",
                vec![EventDef::new(
                    "fulfillment_state",
                    "to_fulfilled",
                    "To Fulfilled",
                    "fulfilled",
                )
                .with_origin("partially_fulfilled")],
            )
            .unwrap()
    }

    #[test]
    fn register_type_rejects_duplicates() {
        let result = fulfillment().register_type(StateType::new("fulfillment_state", "Again"));

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateKey {
                kind: DefinitionKind::Type,
                ..
            })
        ));
    }

    #[test]
    fn register_states_rejects_duplicates() {
        let result = fulfillment().register_states(
            "fulfillment_state",
            vec![StateDef::new("fulfillment_state", "fulfilled", "Done")],
        );

        match result {
            Err(RegistryError::DuplicateKey { kind, key }) => {
                assert_eq!(kind, DefinitionKind::State);
                assert_eq!(key, "fulfillment_state.fulfilled");
            }
            _ => panic!("Expected duplicate state key"),
        }
    }

    #[test]
    fn register_states_requires_registered_type() {
        let result = RegistryBuilder::new()
            .register_states("review", vec![StateDef::new("review", "draft", "Draft")]);

        assert!(matches!(result, Err(RegistryError::NotFound { .. })));
    }

    #[test]
    fn register_events_rejects_foreign_definitions() {
        let result = fulfillment().register_events(
            "fulfillment_state",
            vec![EventDef::new("review", "publish", "Publish", "fulfilled")],
        );

        assert!(matches!(result, Err(RegistryError::TypeMismatch { .. })));
    }

    #[test]
    fn register_events_rejects_duplicates() {
        let result = fulfillment().register_events(
            "fulfillment_state",
            vec![EventDef::new("fulfillment_state", "to_fulfilled", "Again", "fulfilled")],
        );

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateKey {
                kind: DefinitionKind::Event,
                ..
            })
        ));
    }

    #[test]
    fn freeze_produces_readable_registry() {
        let registry = fulfillment().freeze().unwrap();

        assert!(registry.types().get_type("fulfillment_state").is_ok());
        assert_eq!(registry.states().get_states("fulfillment_state").unwrap().len(), 3);
        assert!(registry
            .events()
            .get_event("fulfillment_state", "to_fulfilled")
            .is_some());
    }

    #[test]
    fn mutators_apply_in_registration_order() {
        let registry = fulfillment()
            .alter_events(|events| {
                events.entry("fulfillment_state".to_string()).or_default().push(
                    EventDef::new("fulfillment_state", "reset", "Reset", "unfulfilled"),
                );
            })
            .alter_events(|events| {
                if let Some(list) = events.get_mut("fulfillment_state") {
                    list.retain(|event| event.key != "reset");
                }
            })
            .freeze()
            .unwrap();

        assert!(registry.events().get_event("fulfillment_state", "reset").is_none());
        assert!(registry
            .events()
            .get_event("fulfillment_state", "to_fulfilled")
            .is_some());
    }

    #[test]
    fn type_mutator_can_remove_a_type() {
        let registry = fulfillment()
            .alter_types(|types| {
                types.insert("review".to_string(), StateType::new("review", "Review"));
            })
            .alter_states(|states| {
                states.insert(
                    "review".to_string(),
                    vec![StateDef::new("review", "draft", "Draft")],
                );
            })
            .alter_types(|types| {
                types.remove("review");
            })
            .alter_states(|states| {
                states.remove("review");
            })
            .freeze()
            .unwrap();

        assert!(registry.types().get_type("review").is_err());
        assert!(!registry.states().is_valid_state("review", "draft"));
    }

    #[test]
    fn freeze_rejects_events_broken_by_state_mutators() {
        let result = fulfillment()
            .alter_states(|states| {
                if let Some(list) = states.get_mut("fulfillment_state") {
                    list.retain(|state| state.key != "partially_fulfilled");
                }
            })
            .freeze();

        match result {
            Err(RegistryError::InvalidDefinitions(errors)) => {
                assert_eq!(
                    errors,
                    vec![DefinitionError::UnknownOriginState {
                        type_key: "fulfillment_state".to_string(),
                        event_key: "to_fulfilled".to_string(),
                        state: "partially_fulfilled".to_string(),
                    }]
                );
            }
            _ => panic!("Expected invalid definitions"),
        }
    }

    #[test]
    fn freeze_collects_errors_across_registries() {
        let result = fulfillment()
            .alter_types(|types| {
                types.insert("review".to_string(), StateType::new("review", "Review"));
            })
            .alter_events(|events| {
                events.insert(
                    "shipping".to_string(),
                    vec![EventDef::new("shipping", "ship", "Ship", "shipped")],
                );
            })
            .freeze();

        match result {
            Err(RegistryError::InvalidDefinitions(errors)) => {
                assert!(errors.contains(&DefinitionError::NoStates {
                    type_key: "review".to_string(),
                }));
                assert!(errors.contains(&DefinitionError::UnknownType {
                    kind: DefinitionKind::Event,
                    type_key: "shipping".to_string(),
                }));
                assert!(errors.contains(&DefinitionError::UnknownTargetState {
                    type_key: "shipping".to_string(),
                    event_key: "ship".to_string(),
                    state: "shipped".to_string(),
                }));
            }
            _ => panic!("Expected invalid definitions"),
        }
    }

    #[test]
    fn freeze_rejects_duplicates_and_foreign_records_from_mutators() {
        let result = fulfillment()
            .alter_states(|states| {
                if let Some(list) = states.get_mut("fulfillment_state") {
                    list.push(StateDef::new("review", "archived", "Archived"));
                }
            })
            .alter_events(|events| {
                if let Some(list) = events.get_mut("fulfillment_state") {
                    list.push(EventDef::new(
                        "fulfillment_state",
                        "to_fulfilled",
                        "Fulfill again",
                        "fulfilled",
                    ));
                }
            })
            .freeze();

        match result {
            Err(RegistryError::InvalidDefinitions(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        DefinitionError::KeyMismatch {
                            kind: DefinitionKind::State,
                            expected: "fulfillment_state".to_string(),
                            found: "review".to_string(),
                        },
                        DefinitionError::DuplicateKey {
                            kind: DefinitionKind::Event,
                            key: "fulfillment_state.to_fulfilled".to_string(),
                        },
                    ]
                );
            }
            _ => panic!("Expected invalid definitions"),
        }
    }
}
