//! Order Fulfillment
//!
//! This example demonstrates a fulfillment workflow assembled from a JSON
//! document, extended by alter mutators and driven by the executor.
//!
//! Key concepts:
//! - Loading definitions from configuration
//! - Alter mutators adding states and events before the freeze
//! - Observers announcing state changes using registry labels
//! - Rejected transitions
//!
//! Run with: cargo run --example order_fulfillment

use entity_state::core::{Entity, EventDef, StateDef};
use entity_state::executor::{EventNotification, InMemoryEntityStore, TransitionExecutor};
use entity_state::{Registry, RegistryConfig};
use std::sync::Arc;

const DEFINITIONS: &str = r#"{
    "types": {
        "fulfillment_state": {
            "label": "Fulfillment state",
            "description": "The current state of the checkout process.",
            "entity_types": ["commerce_order"]
        }
    },
    "states": {
        "fulfillment_state": [
            { "key": "unfulfilled", "label": "Unfulfilled" },
            { "key": "partially_fulfilled", "label": "Partially fulfilled" },
            { "key": "fulfilled", "label": "Fulfilled" }
        ]
    },
    "events": {
        "fulfillment_state": [
            {
                "key": "to_partially_fulfilled",
                "label": "To Partially fulfilled",
                "target": "partially_fulfilled",
                "origin": ["unfulfilled"]
            },
            {
                "key": "to_fulfilled",
                "label": "To Fulfilled",
                "target": "fulfilled",
                "origin": ["partially_fulfilled"]
            }
        ]
    }
}"#;

#[derive(Debug)]
struct Order {
    id: u64,
}

impl Entity for Order {
    fn entity_id(&self) -> String {
        self.id.to_string()
    }
}

fn announce(registry: &Registry, notification: &EventNotification<'_, Order>) -> String {
    let type_label = registry
        .types()
        .get_type(notification.type_key)
        .map(|t| t.label.as_str())
        .unwrap_or(notification.type_key);
    let state_label = registry
        .states()
        .get_state(notification.type_key, notification.new_state)
        .map(|s| s.label.as_str())
        .unwrap_or(notification.new_state);

    format!(
        "Order {}'s {} has just been updated to {}.",
        notification.entity.id, type_label, state_label
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Order Fulfillment ===\n");

    let registry = RegistryConfig::load(DEFINITIONS)?
        .alter_states(|states| {
            if let Some(list) = states.get_mut("fulfillment_state") {
                list.push(StateDef::new("fulfillment_state", "returned", "Returned"));
            }
        })
        .alter_events(|events| {
            if let Some(list) = events.get_mut("fulfillment_state") {
                list.push(
                    EventDef::new("fulfillment_state", "to_returned", "To Returned", "returned")
                        .with_origins(["partially_fulfilled", "fulfilled"]),
                );
            }
        })
        .freeze()?;
    let registry = Arc::new(registry);

    let mut executor: TransitionExecutor<Order, InMemoryEntityStore> =
        TransitionExecutor::new(Arc::clone(&registry), InMemoryEntityStore::new());
    let labels = Arc::clone(&registry);
    executor.add_observer_fn(move |n: &EventNotification<'_, Order>| {
        println!("  [Observer] {}", announce(&labels, n));
        if !n.log_message.is_empty() {
            println!("  [Log] {}", n.log_message);
        }
        Ok(())
    });

    let order = Order { id: 1001 };
    let state = executor.assign_default_state("commerce_order", &order, "fulfillment_state")?;
    println!("Order {} starts as '{}'", order.id, state);

    println!("\nTrying to fulfill before shipping anything...");
    if let Err(error) = executor.fire_event(
        "commerce_order",
        &order,
        "fulfillment_state",
        "to_fulfilled",
        "",
    ) {
        println!("  Rejected: {}", error);
    }

    for (event, log) in [
        ("to_partially_fulfilled", "First parcel left the warehouse"),
        ("to_fulfilled", "Second parcel left the warehouse"),
        ("to_returned", "Customer sent everything back"),
    ] {
        println!("\nFiring '{}'...", event);
        let fired = executor.fire_event("commerce_order", &order, "fulfillment_state", event, log)?;
        println!("  {} -> {}", fired.previous_state, fired.new_state);
    }

    let terminal: Vec<&str> = registry
        .terminal_states("fulfillment_state")
        .into_iter()
        .map(|s| s.key.as_str())
        .collect();
    println!("\nTerminal states: {:?}", terminal);

    Ok(())
}
