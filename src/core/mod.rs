//! Core definition types.
//!
//! This module contains the plain values the rest of the crate moves around:
//! - State types, states and events as typed records
//! - The `Entity` trait and per-entity state records
//!
//! Nothing in here performs I/O or holds shared state.

mod definition;
mod record;

pub use definition::{EventDef, StateDef, StateType};
pub use record::{Entity, EntityStateRecord};
