//! Declarative registry definitions loaded from JSON.
//!
//! The document mirrors the three alter mappings: types keyed by type key,
//! and per-type ordered lists of states and events.
//!
//! ```json
//! {
//!   "types": {
//!     "fulfillment_state": {
//!       "label": "Fulfillment state",
//!       "description": "The current state of the checkout process.",
//!       "entity_types": ["commerce_order"]
//!     }
//!   },
//!   "states": {
//!     "fulfillment_state": [
//!       { "key": "unfulfilled", "label": "Unfulfilled" },
//!       { "key": "fulfilled", "label": "Fulfilled" }
//!     ]
//!   },
//!   "events": {
//!     "fulfillment_state": [
//!       { "key": "to_fulfilled", "label": "To Fulfilled",
//!         "target": "fulfilled", "origin": ["unfulfilled"] }
//!     ]
//!   }
//! }
//! ```

use crate::core::{EventDef, StateDef, StateType};
use crate::registry::{RegistryBuilder, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub mod error;

pub use error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeConfig {
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entity_types: BTreeSet<String>,
    #[serde(default)]
    pub initial_state: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    pub key: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub key: String,
    pub label: String,
    pub target: String,
    #[serde(default)]
    pub origin: BTreeSet<String>,
}

/// Registry definitions as read from a configuration document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub types: BTreeMap<String, TypeConfig>,
    #[serde(default)]
    pub states: BTreeMap<String, Vec<StateConfig>>,
    #[serde(default)]
    pub events: BTreeMap<String, Vec<EventConfig>>,
}

impl RegistryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a document and register its definitions on a fresh builder.
    pub fn load(json: &str) -> Result<RegistryBuilder, ConfigError> {
        Ok(RegistryBuilder::from_config(Self::from_json_str(json)?)?)
    }
}

impl RegistryBuilder {
    /// Register every definition from a configuration document.
    ///
    /// Types are registered first, then states and events per type in
    /// document order. Mutators may still be queued afterwards.
    pub fn from_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        Self::new().apply_config(config)
    }

    /// Register a configuration document's definitions on this builder.
    pub fn apply_config(self, config: RegistryConfig) -> Result<Self, RegistryError> {
        let RegistryConfig {
            types,
            states,
            events,
        } = config;

        let mut builder = self;
        for (key, type_config) in types {
            builder = builder.register_type(StateType {
                key,
                label: type_config.label,
                description: type_config.description,
                entity_kinds: type_config.entity_types,
                initial_state: type_config.initial_state,
            })?;
        }

        for (type_key, list) in states {
            let defs: Vec<StateDef> = list
                .into_iter()
                .map(|state| StateDef::new(type_key.as_str(), state.key, state.label))
                .collect();
            builder = builder.register_states(&type_key, defs)?;
        }

        for (type_key, list) in events {
            let defs: Vec<EventDef> = list
                .into_iter()
                .map(|event| {
                    EventDef::new(type_key.as_str(), event.key, event.label, event.target)
                        .with_origins(event.origin)
                })
                .collect();
            builder = builder.register_events(&type_key, defs)?;
        }

        Ok(builder)
    }
}
