//! Frozen registry of state types.

use crate::core::StateType;
use crate::registry::error::{
    combine, ensure, DefinitionCheck, DefinitionError, DefinitionKind, RegistryError,
};
use std::collections::BTreeMap;

/// Mapping of type key to type definition, as seen by alter mutators.
pub type TypeMap = BTreeMap<String, StateType>;

/// Read-only view over every registered state type.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: TypeMap,
}

impl TypeRegistry {
    pub(crate) fn new(types: TypeMap) -> Self {
        Self { types }
    }

    /// Look up a type by key.
    pub fn get_type(&self, key: &str) -> Result<&StateType, RegistryError> {
        self.types.get(key).ok_or_else(|| RegistryError::NotFound {
            kind: DefinitionKind::Type,
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    /// All types, ordered by key.
    pub fn types(&self) -> impl Iterator<Item = &StateType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Every mapping key must match the key of the type filed under it.
pub(crate) fn validate_types(types: &TypeMap) -> DefinitionCheck {
    combine(
        types
            .iter()
            .map(|(key, state_type)| {
                ensure(*key == state_type.key, || DefinitionError::KeyMismatch {
                    kind: DefinitionKind::Type,
                    expected: key.clone(),
                    found: state_type.key.clone(),
                })
            })
            .collect(),
    )
}
