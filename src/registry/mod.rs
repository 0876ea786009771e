//! Type, state and event registries.
//!
//! Registries are populated once during a configuration phase through
//! [`RegistryBuilder`]. Alter mutators run at freeze time, the result is
//! validated as a whole, and the frozen [`Registry`] is read-only from then
//! on. Share it between executors with an `Arc`.

mod builder;
mod error;
mod events;
mod states;
mod types;

pub use builder::{Mutator, RegistryBuilder};
pub use error::{DefinitionCheck, DefinitionError, DefinitionKind, RegistryError};
pub use events::{EventMap, EventRegistry};
pub use states::{StateMap, StateRegistry};
pub use types::{TypeMap, TypeRegistry};

use crate::core::StateDef;

/// Frozen set of type, state and event definitions.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    pub(crate) types: TypeRegistry,
    pub(crate) states: StateRegistry,
    pub(crate) events: EventRegistry,
}

impl Registry {
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn states(&self) -> &StateRegistry {
        &self.states
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// States of a type that no event leaves.
    ///
    /// Informational only: nothing stops a later event definition from
    /// leaving them, and the executor does not treat them specially.
    pub fn terminal_states(&self, type_key: &str) -> Vec<&StateDef> {
        self.states
            .get_states(type_key)
            .map(|states| {
                states
                    .iter()
                    .filter(|state| !self.events.has_outgoing(type_key, &state.key))
                    .collect()
            })
            .unwrap_or_default()
    }
}
