//! Property-based tests for registry validation and transition execution.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated definitions and event sequences.

use entity_state::core::{Entity, EventDef, StateDef, StateType};
use entity_state::executor::{InMemoryEntityStore, TransitionError, TransitionExecutor};
use entity_state::registry::{DefinitionError, Registry, RegistryBuilder, RegistryError};
use proptest::prelude::*;
use std::sync::Arc;

const TYPE_KEY: &str = "workflow";
const STATE_COUNT: usize = 5;

#[derive(Debug)]
struct Document {
    id: u32,
}

impl Entity for Document {
    fn entity_id(&self) -> String {
        self.id.to_string()
    }
}

fn state_key(index: usize) -> String {
    format!("s{index}")
}

fn builder() -> RegistryBuilder {
    RegistryBuilder::new()
        .register_type(StateType::new(TYPE_KEY, "Workflow"))
        .unwrap()
        .register_states(
            TYPE_KEY,
            (0..STATE_COUNT).map(|i| StateDef::new(TYPE_KEY, state_key(i), format!("State {i}"))),
        )
        .unwrap()
}

prop_compose! {
    // Target and origins always index into the registered states.
    fn valid_event(index: usize)(
        target in 0..STATE_COUNT,
        origins in prop::collection::btree_set(0..STATE_COUNT, 0..3),
    ) -> EventDef {
        EventDef::new(TYPE_KEY, format!("e{index}"), format!("Event {index}"), state_key(target))
            .with_origins(origins.into_iter().map(state_key))
    }
}

fn valid_events() -> impl Strategy<Value = Vec<EventDef>> {
    (1..6usize).prop_flat_map(|count| {
        (0..count)
            .map(valid_event)
            .collect::<Vec<_>>()
    })
}

fn frozen(events: Vec<EventDef>) -> Registry {
    builder().register_events(TYPE_KEY, events).unwrap().freeze().unwrap()
}

proptest! {
    #[test]
    fn freeze_accepts_events_over_registered_states(events in valid_events()) {
        let count = events.len();
        let registry = builder().register_events(TYPE_KEY, events).unwrap().freeze();

        prop_assert!(registry.is_ok());
        prop_assert_eq!(registry.unwrap().events().events_for(TYPE_KEY).len(), count);
    }

    #[test]
    fn freeze_rejects_unknown_target(
        events in valid_events(),
        unknown in "[a-z]{3,8}",
    ) {
        let mut events = events;
        events.push(EventDef::new(TYPE_KEY, "broken", "Broken", unknown.clone()));

        let result = builder().register_events(TYPE_KEY, events).unwrap().freeze();

        match result {
            Err(RegistryError::InvalidDefinitions(errors)) => {
                let expected = DefinitionError::UnknownTargetState {
                    type_key: TYPE_KEY.to_string(),
                    event_key: "broken".to_string(),
                    state: unknown,
                };
                prop_assert!(errors.contains(&expected));
            }
            _ => prop_assert!(false, "Expected invalid definitions"),
        }
    }

    #[test]
    fn freeze_rejects_unknown_origin(
        events in valid_events(),
        target in 0..STATE_COUNT,
        unknown in "[a-z]{3,8}",
    ) {
        let mut events = events;
        events.push(
            EventDef::new(TYPE_KEY, "broken", "Broken", state_key(target))
                .with_origin(unknown.clone()),
        );

        let result = builder().register_events(TYPE_KEY, events).unwrap().freeze();

        match result {
            Err(RegistryError::InvalidDefinitions(errors)) => {
                prop_assert_eq!(errors, vec![DefinitionError::UnknownOriginState {
                    type_key: TYPE_KEY.to_string(),
                    event_key: "broken".to_string(),
                    state: unknown,
                }]);
            }
            _ => prop_assert!(false, "Expected invalid definitions"),
        }
    }

    #[test]
    fn fired_events_keep_record_valid(
        events in valid_events(),
        picks in prop::collection::vec(0..6usize, 1..20),
    ) {
        let registry = Arc::new(frozen(events));
        let executor: TransitionExecutor<Document, InMemoryEntityStore> =
            TransitionExecutor::new(Arc::clone(&registry), InMemoryEntityStore::new());
        let document = Document { id: 1 };
        let event_keys: Vec<String> = registry
            .events()
            .events_for(TYPE_KEY)
            .iter()
            .map(|e| e.key.clone())
            .collect();

        for pick in picks {
            let event_key = &event_keys[pick % event_keys.len()];
            let before = executor.current_state("doc", &document, TYPE_KEY).unwrap();
            let event = registry.events().get_event(TYPE_KEY, event_key).unwrap();

            match executor.fire_event("doc", &document, TYPE_KEY, event_key, "") {
                Ok(fired) => {
                    prop_assert!(event.permits(&before));
                    prop_assert_eq!(&fired.previous_state, &before);
                    prop_assert_eq!(&fired.new_state, &event.target_state);
                }
                Err(TransitionError::InvalidTransition { current_state, .. }) => {
                    prop_assert!(!event.permits(&before));
                    prop_assert_eq!(current_state, before);
                }
                Err(other) => prop_assert!(false, "Unexpected error: {}", other),
            }

            let after = executor.current_state("doc", &document, TYPE_KEY).unwrap();
            prop_assert!(registry.states().is_valid_state(TYPE_KEY, &after));
        }
    }

    #[test]
    fn terminal_states_have_no_available_events(events in valid_events()) {
        let registry = frozen(events);

        for state in registry.terminal_states(TYPE_KEY) {
            prop_assert_eq!(
                registry.events().available_events(TYPE_KEY, &state.key).count(),
                0
            );
        }
    }
}
