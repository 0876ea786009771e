//! Entities and their current-state records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for entities whose state is tracked.
///
/// The entity framework itself lives outside this crate. All the executor
/// needs is a stable identifier to key records by; observers receive the
/// concrete entity type back.
///
/// # Example
///
/// ```rust
/// use entity_state::core::Entity;
///
/// #[derive(Debug)]
/// struct Order {
///     order_id: u64,
/// }
///
/// impl Entity for Order {
///     fn entity_id(&self) -> String {
///         self.order_id.to_string()
///     }
/// }
///
/// assert_eq!(Order { order_id: 7 }.entity_id(), "7");
/// ```
pub trait Entity: Debug + Send + Sync {
    /// Identifier unique within the entity's kind.
    fn entity_id(&self) -> String;
}

/// Current value of one state type for one entity.
///
/// Records are created on the first transition or state assignment and are
/// never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityStateRecord {
    pub entity_kind: String,
    pub entity_id: String,
    pub type_key: String,
    pub current_state: String,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl EntityStateRecord {
    pub fn new(
        entity_kind: impl Into<String>,
        entity_id: impl Into<String>,
        type_key: impl Into<String>,
        current_state: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            entity_id: entity_id.into(),
            type_key: type_key.into(),
            current_state: current_state.into(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Node {
        nid: u32,
    }

    impl Entity for Node {
        fn entity_id(&self) -> String {
            format!("node-{}", self.nid)
        }
    }

    #[test]
    fn entity_id_is_stable() {
        let node = Node { nid: 12 };
        assert_eq!(node.entity_id(), node.entity_id());
        assert_eq!(node.entity_id(), "node-12");
    }

    #[test]
    fn record_serializes_correctly() {
        let record = EntityStateRecord::new("node", "12", "review", "draft");

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: EntityStateRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }
}
