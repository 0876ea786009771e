//! Entity State: a registry of entity state types with a transition executor
//!
//! Entity State tracks named status axes ("state types") on entities of a
//! host application. Each type has an ordered set of valid states and a set
//! of events, each moving an entity from permitted origin states to one
//! target state.
//!
//! # Core Concepts
//!
//! - **Registry**: Types, states and events, built and altered during a
//!   configuration phase, then frozen and validated as a whole
//! - **Alter mutators**: Ordered callbacks that may change any registered
//!   mapping before the freeze
//! - **Executor**: Fires events on entities, persisting through an
//!   `EntityStore` and announcing the change to `Observer`s
//!
//! # Example
//!
//! ```rust
//! use entity_state::core::{Entity, EventDef, StateDef, StateType};
//! use entity_state::executor::{InMemoryEntityStore, TransitionError, TransitionExecutor};
//! use entity_state::registry::RegistryBuilder;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Order {
//!     id: u64,
//! }
//!
//! impl Entity for Order {
//!     fn entity_id(&self) -> String {
//!         self.id.to_string()
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register_type(
//!         StateType::new("fulfillment_state", "Fulfillment state").for_entity_kind("commerce_order"),
//!     )?
//!     .register_states("fulfillment_state", vec![
//!         StateDef::new("fulfillment_state", "unfulfilled", "Unfulfilled"),
//!         StateDef::new("fulfillment_state", "partially_fulfilled", "Partially fulfilled"),
//!         StateDef::new("fulfillment_state", "fulfilled", "Fulfilled"),
//!     ])?
//!     .register_events("fulfillment_state", vec![
//!         EventDef::new("fulfillment_state", "to_fulfilled", "To Fulfilled", "fulfilled")
//!             .with_origin("partially_fulfilled"),
//!     ])?
//!     .freeze()?;
//!
//! let executor: TransitionExecutor<Order, _> =
//!     TransitionExecutor::new(Arc::new(registry), InMemoryEntityStore::new());
//! let order = Order { id: 1 };
//!
//! let blocked = executor.fire_event("commerce_order", &order, "fulfillment_state", "to_fulfilled", "");
//! assert!(matches!(blocked, Err(TransitionError::InvalidTransition { .. })));
//!
//! executor.set_state("commerce_order", &order, "fulfillment_state", "partially_fulfilled")?;
//! let fired = executor.fire_event("commerce_order", &order, "fulfillment_state", "to_fulfilled", "Shipped")?;
//! assert_eq!(fired.new_state, "fulfilled");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;
pub mod executor;
pub mod registry;

// Re-export commonly used types
pub use crate::config::RegistryConfig;
pub use crate::core::{Entity, EntityStateRecord, EventDef, StateDef, StateType};
pub use crate::executor::{EntityStore, FiredEvent, Observer, TransitionError, TransitionExecutor};
pub use crate::registry::{Registry, RegistryBuilder, RegistryError};
