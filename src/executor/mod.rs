//! Transition execution against a frozen registry.
//!
//! This module is the imperative shell around the registry: it reads and
//! writes current states through an [`EntityStore`] and announces fired
//! events to [`Observer`]s.
//!
//! # Firing an event
//!
//! 1. Resolve the event for the type; the type must apply to the entity kind
//! 2. Load the entity's current state, defaulting to the type's initial state
//! 3. Check the event permits that state (an empty origin set permits any)
//! 4. Persist the target state
//! 5. Notify observers in registration order, isolating their failures

mod error;
mod machine;
mod observer;
mod store;

pub use error::TransitionError;
pub use machine::{FiredEvent, TransitionExecutor};
pub use observer::{EventNotification, Observer, ObserverError};
pub use store::{EntityStore, InMemoryEntityStore, StoreError};
