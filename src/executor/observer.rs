//! Observers notified after an event has been fired.

use crate::core::Entity;
use thiserror::Error;

/// Failure reported by an observer. Logged by the executor, never returned.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Observer failed: {message}")]
pub struct ObserverError {
    pub message: String,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Context handed to observers once a transition has been persisted.
#[derive(Debug)]
pub struct EventNotification<'a, E: Entity> {
    pub entity_kind: &'a str,
    pub entity: &'a E,
    pub type_key: &'a str,
    /// State the entity is in now
    pub new_state: &'a str,
    pub event_key: &'a str,
    pub log_message: &'a str,
}

/// Receiver of fired-event notifications.
///
/// Closures with the matching signature implement this trait.
pub trait Observer<E: Entity>: Send + Sync {
    fn event_fired(&self, notification: &EventNotification<'_, E>) -> Result<(), ObserverError>;
}

impl<E, F> Observer<E> for F
where
    E: Entity,
    F: Fn(&EventNotification<'_, E>) -> Result<(), ObserverError> + Send + Sync,
{
    fn event_fired(&self, notification: &EventNotification<'_, E>) -> Result<(), ObserverError> {
        self(notification)
    }
}
