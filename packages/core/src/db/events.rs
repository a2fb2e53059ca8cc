//! Domain Events
//!
//! This module defines the domain events emitted by the services after a
//! mutation has been committed. Events follow the observer pattern, allowing
//! other parts of a system (caches, UI bridges) to react to changes without
//! coupling to the store implementation.
//!
//! # Architecture
//!
//! Events are emitted using tokio's broadcast channel, allowing multiple
//! subscribers to receive notifications asynchronously. Rejected operations
//! never emit events.

use crate::models::{Item, Menu};
use serde::{Deserialize, Serialize};

/// Where an item sits: its menu and its parent inside that menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPosition {
    pub menu_id: String,
    pub parent_id: Option<String>,
}

/// Domain events emitted by the services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    /// A menu was created
    MenuCreated { menu: Menu },

    /// A menu's name or limits changed
    MenuUpdated { menu: Menu },

    /// A menu and all of its items were removed
    MenuDeleted { id: String },

    /// A menu's encoding was rebuilt
    MenuRebuilt { menu_id: String },

    /// A new item was created
    ItemCreated { item: Item },

    /// An item's content changed
    ItemUpdated { item: Item },

    /// An item (with its subtree) changed menu and/or parent
    ItemMoved {
        item_id: String,
        from: ItemPosition,
        to: ItemPosition,
    },

    /// An item was deleted
    ItemDeleted { id: String, menu_id: String },

    /// A whole layer was removed and its children reparented
    LayerDeleted {
        menu_id: String,
        layer: usize,
        removed: Vec<String>,
    },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::MenuCreated { .. } => "menu:created",
            DomainEvent::MenuUpdated { .. } => "menu:updated",
            DomainEvent::MenuDeleted { .. } => "menu:deleted",
            DomainEvent::MenuRebuilt { .. } => "menu:rebuilt",
            DomainEvent::ItemCreated { .. } => "item:created",
            DomainEvent::ItemUpdated { .. } => "item:updated",
            DomainEvent::ItemMoved { .. } => "item:moved",
            DomainEvent::ItemDeleted { .. } => "item:deleted",
            DomainEvent::LayerDeleted { .. } => "layer:deleted",
        }
    }
}
