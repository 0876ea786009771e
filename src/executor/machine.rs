//! Transition executor: validates, applies and announces events.

use crate::core::{Entity, EventDef, StateType};
use crate::executor::error::TransitionError;
use crate::executor::observer::{EventNotification, Observer, ObserverError};
use crate::executor::store::EntityStore;
use crate::registry::Registry;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Outcome of a successfully fired event.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredEvent {
    pub type_key: String,
    pub event_key: String,
    /// State before the event, possibly the type's initial state
    pub previous_state: String,
    pub new_state: String,
    pub fired_at: DateTime<Utc>,
    pub observers_notified: usize,
    /// Observers that returned an error or panicked
    pub observer_failures: usize,
}

/// Applies events to entities against a frozen registry.
///
/// The registry is read-only here. Current states live in the store; the
/// executor itself holds no per-entity data, so one executor can serve any
/// number of entities of type `E`.
pub struct TransitionExecutor<E: Entity, St: EntityStore> {
    registry: Arc<Registry>,
    store: St,
    observers: Vec<Box<dyn Observer<E>>>,
}

impl<E: Entity, St: EntityStore> TransitionExecutor<E, St> {
    pub fn new(registry: Arc<Registry>, store: St) -> Self {
        Self {
            registry,
            store,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers run in registration order.
    pub fn add_observer<O>(&mut self, observer: O)
    where
        O: Observer<E> + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Register a closure as an observer.
    pub fn add_observer_fn<F>(&mut self, observer: F)
    where
        F: Fn(&EventNotification<'_, E>) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Fire `event_key` on an entity.
    ///
    /// The event must exist for the type and permit the entity's current
    /// state (its type's initial state when no record exists). The target
    /// state is persisted before observers are told. A store failure is
    /// returned and observers do not run. Observer failures are logged and
    /// counted in the outcome, they never fail the transition.
    pub fn fire_event(
        &self,
        entity_kind: &str,
        entity: &E,
        type_key: &str,
        event_key: &str,
        log_message: &str,
    ) -> Result<FiredEvent, TransitionError> {
        self.resolve_type(entity_kind, type_key)?;
        let event = self.resolve_event(type_key, event_key)?;

        let entity_id = entity.entity_id();
        let previous_state = self.load_state(entity_kind, &entity_id, type_key)?;

        if !event.permits(&previous_state) {
            return Err(TransitionError::InvalidTransition {
                type_key: type_key.to_string(),
                event_key: event_key.to_string(),
                current_state: previous_state,
            });
        }

        self.store
            .save_current_state(entity_kind, &entity_id, type_key, &event.target_state)?;
        let fired_at = Utc::now();

        tracing::debug!(
            entity_kind,
            entity_id = %entity_id,
            type_key,
            event_key,
            from = %previous_state,
            to = %event.target_state,
            "Event fired"
        );

        let notification = EventNotification {
            entity_kind,
            entity,
            type_key,
            new_state: &event.target_state,
            event_key,
            log_message,
        };
        let observer_failures = self.notify(&notification);

        Ok(FiredEvent {
            type_key: type_key.to_string(),
            event_key: event_key.to_string(),
            previous_state,
            new_state: event.target_state.clone(),
            fired_at,
            observers_notified: self.observers.len(),
            observer_failures,
        })
    }

    /// Current state of an entity, falling back to the type's initial state.
    pub fn current_state(
        &self,
        entity_kind: &str,
        entity: &E,
        type_key: &str,
    ) -> Result<String, TransitionError> {
        self.resolve_type(entity_kind, type_key)?;
        self.load_state(entity_kind, &entity.entity_id(), type_key)
    }

    /// Assign a state directly, without an event. Observers are not told.
    pub fn set_state(
        &self,
        entity_kind: &str,
        entity: &E,
        type_key: &str,
        state_key: &str,
    ) -> Result<(), TransitionError> {
        self.resolve_type(entity_kind, type_key)?;
        if !self.registry.states().is_valid_state(type_key, state_key) {
            return Err(TransitionError::InvalidState {
                type_key: type_key.to_string(),
                state: state_key.to_string(),
            });
        }

        let entity_id = entity.entity_id();
        self.store
            .save_current_state(entity_kind, &entity_id, type_key, state_key)?;
        tracing::debug!(
            entity_kind,
            entity_id = %entity_id,
            type_key,
            state = state_key,
            "State assigned"
        );
        Ok(())
    }

    /// Persist the type's initial state if the entity has no record yet.
    ///
    /// Returns the entity's state afterwards. Existing records are left alone.
    pub fn assign_default_state(
        &self,
        entity_kind: &str,
        entity: &E,
        type_key: &str,
    ) -> Result<String, TransitionError> {
        self.resolve_type(entity_kind, type_key)?;
        let entity_id = entity.entity_id();

        if let Some(state) = self
            .store
            .load_current_state(entity_kind, &entity_id, type_key)?
        {
            return Ok(state);
        }

        let initial = self.initial_state(type_key)?;
        self.store
            .save_current_state(entity_kind, &entity_id, type_key, &initial)?;
        Ok(initial)
    }

    /// Events that can currently fire on the entity, in registration order.
    pub fn available_events(
        &self,
        entity_kind: &str,
        entity: &E,
        type_key: &str,
    ) -> Result<Vec<&EventDef>, TransitionError> {
        let current = self.current_state(entity_kind, entity, type_key)?;
        Ok(self
            .registry
            .events()
            .available_events(type_key, &current)
            .collect())
    }

    fn resolve_type(
        &self,
        entity_kind: &str,
        type_key: &str,
    ) -> Result<&StateType, TransitionError> {
        let state_type = self
            .registry
            .types()
            .get_type(type_key)
            .map_err(|_| TransitionError::NotFound {
                type_key: type_key.to_string(),
            })?;

        if !state_type.applies_to(entity_kind) {
            return Err(TransitionError::NotApplicable {
                type_key: type_key.to_string(),
                entity_kind: entity_kind.to_string(),
            });
        }
        Ok(state_type)
    }

    fn resolve_event(&self, type_key: &str, event_key: &str) -> Result<&EventDef, TransitionError> {
        self.registry
            .events()
            .get_event(type_key, event_key)
            .ok_or_else(|| TransitionError::UnknownEvent {
                type_key: type_key.to_string(),
                event_key: event_key.to_string(),
            })
    }

    fn initial_state(&self, type_key: &str) -> Result<String, TransitionError> {
        self.registry
            .states()
            .initial_state(type_key)
            .map(str::to_string)
            .ok_or_else(|| TransitionError::NotFound {
                type_key: type_key.to_string(),
            })
    }

    /// Stored state, or the initial state when there is no record.
    /// A stored state the registry no longer knows is rejected.
    fn load_state(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
    ) -> Result<String, TransitionError> {
        match self
            .store
            .load_current_state(entity_kind, entity_id, type_key)?
        {
            Some(state) if self.registry.states().is_valid_state(type_key, &state) => Ok(state),
            Some(state) => Err(TransitionError::InvalidState {
                type_key: type_key.to_string(),
                state,
            }),
            None => self.initial_state(type_key),
        }
    }

    /// Run every observer, isolating errors and panics. Returns the number
    /// of observers that failed.
    fn notify(&self, notification: &EventNotification<'_, E>) -> usize {
        let mut failures = 0;

        for (index, observer) in self.observers.iter().enumerate() {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| observer.event_fired(notification)));

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    failures += 1;
                    tracing::warn!(
                        observer = index,
                        type_key = notification.type_key,
                        event_key = notification.event_key,
                        error = %error,
                        "Observer failed"
                    );
                }
                Err(payload) => {
                    failures += 1;
                    tracing::error!(
                        observer = index,
                        type_key = notification.type_key,
                        event_key = notification.event_key,
                        panic = %panic_message(payload.as_ref()),
                        "Observer panicked"
                    );
                }
            }
        }

        failures
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
