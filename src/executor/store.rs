//! Entity storage collaborator.

use crate::core::EntityStateRecord;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors reported by an entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entity store backend failed: {0}")]
    Backend(String),

    #[error("Entity store lock poisoned")]
    Poisoned,
}

/// Storage for the current state of each (entity, type) pair.
///
/// Real deployments back this with the host's entity storage. The executor
/// only needs a synchronous call/return contract.
pub trait EntityStore: Send + Sync {
    /// Current state, or `None` when the entity has no record for the type.
    fn load_current_state(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
    ) -> Result<Option<String>, StoreError>;

    fn save_current_state(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
        state_key: &str,
    ) -> Result<(), StoreError>;
}

type RecordKey = (String, String, String);

/// Process-local store keeping full records behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    records: Mutex<HashMap<RecordKey, EntityStateRecord>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full record for an (entity, type) pair.
    pub fn record(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
    ) -> Result<Option<EntityStateRecord>, StoreError> {
        let records = self.lock()?;
        Ok(records.get(&key(entity_kind, entity_id, type_key)).cloned())
    }

    /// All records, ordered by entity kind, entity id and type.
    pub fn records(&self) -> Result<Vec<EntityStateRecord>, StoreError> {
        let records = self.lock()?;
        let mut all: Vec<_> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            (&a.entity_kind, &a.entity_id, &a.type_key).cmp(&(
                &b.entity_kind,
                &b.entity_id,
                &b.type_key,
            ))
        });
        Ok(all)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RecordKey, EntityStateRecord>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl EntityStore for InMemoryEntityStore {
    fn load_current_state(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
    ) -> Result<Option<String>, StoreError> {
        let records = self.lock()?;
        Ok(records
            .get(&key(entity_kind, entity_id, type_key))
            .map(|record| record.current_state.clone()))
    }

    fn save_current_state(
        &self,
        entity_kind: &str,
        entity_id: &str,
        type_key: &str,
        state_key: &str,
    ) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        records
            .entry(key(entity_kind, entity_id, type_key))
            .and_modify(|record| {
                record.current_state = state_key.to_string();
                record.updated_at = Utc::now();
            })
            .or_insert_with(|| {
                EntityStateRecord::new(entity_kind, entity_id, type_key, state_key)
            });
        Ok(())
    }
}

fn key(entity_kind: &str, entity_id: &str, type_key: &str) -> RecordKey {
    (
        entity_kind.to_string(),
        entity_id.to_string(),
        type_key.to_string(),
    )
}
