//! Service Layer Error Types
//!
//! This module defines the error taxonomy shared by the encoding layer, the
//! constraint validator and the services. Validation failures are reported
//! before anything is written; storage and encoding failures are fatal to the
//! operation that raised them.

use crate::models::ValidationError;
use thiserror::Error;

/// Engine operation errors
#[derive(Error, Debug)]
pub enum MenuTreeError {
    /// Menu not found by ID
    #[error("Menu not found: {id}")]
    MenuNotFound { id: String },

    /// Item not found by ID
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// Item content failed shape validation
    #[error("Invalid content for item '{name}': {source}")]
    InvalidContent {
        name: String,
        #[source]
        source: ValidationError,
    },

    /// Menu fields failed shape validation
    #[error("Invalid menu: {0}")]
    InvalidMenu(#[from] ValidationError),

    /// The operation would place an item below the menu's deepest permitted layer
    #[error("Maximum items depth for menu {menu_id} is {max_depth}, operation needs layer {layer}")]
    DepthExceeded {
        menu_id: String,
        max_depth: u32,
        layer: usize,
    },

    /// The operation would put too many items into one layer
    #[error("Maximum items per layer for menu {menu_id} is {max_children}, layer {layer} would hold {count}")]
    ChildrenExceeded {
        menu_id: String,
        max_children: u32,
        layer: usize,
        count: usize,
    },

    /// The new parent is a descendant of the item being moved
    #[error("Cannot move item {item_id} under its descendant {parent_id}")]
    CyclicMove { item_id: String, parent_id: String },

    /// The new parent is the item itself
    #[error("Item {item_id} cannot become its own parent")]
    SelfParenting { item_id: String },

    /// Single-item delete requested on an item that still has children
    #[error("Item {item_id} still has {children} children; delete the subtree or the layer instead")]
    HasChildren { item_id: String, children: usize },

    /// Reparenting the children of a deleted layer would overflow a parent
    #[error("Layer {layer} of menu {menu_id} cannot be deleted: {} would hold {count} children, maximum is {max_children}", parent_label(.parent_id))]
    LayerDeleteViolatesChildLimit {
        menu_id: String,
        layer: usize,
        parent_id: Option<String>,
        count: usize,
        max_children: u32,
    },

    /// Parent item belongs to a different menu than the requested one
    #[error("Parent item {parent_id} does not belong to menu {menu_id}")]
    ParentMenuMismatch { parent_id: String, menu_id: String },

    /// Layer numbers are 1-based
    #[error("Invalid layer number {layer}: layers start at 1")]
    InvalidLayer { layer: usize },

    /// A limit update would be stricter than the menu's current shape
    #[error("Cannot set {field} of menu {menu_id} to {requested}: current value is {current}")]
    LimitBelowCurrentShape {
        menu_id: String,
        field: &'static str,
        requested: u32,
        current: usize,
    },

    /// Nested-set bounds could not be made consistent (internal invariant violation)
    #[error("Encoding corrupt in menu {menu_id}{}: {reason}", item_suffix(.item_id))]
    EncodingCorrupt {
        menu_id: String,
        item_id: Option<String>,
        reason: String,
    },

    /// Storage failed while committing a bulk creation
    #[error("Bulk creation of {attempted} items in menu {menu_id} failed during commit: {source}")]
    PartialCreateFailure {
        menu_id: String,
        attempted: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Tree store operation failed
    #[error("Storage operation failed: {0}")]
    StorageFailed(#[from] anyhow::Error),

    /// Engine configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn parent_label(parent_id: &Option<String>) -> &str {
    parent_id.as_deref().unwrap_or("the root layer")
}

fn item_suffix(item_id: &Option<String>) -> String {
    item_id
        .as_deref()
        .map(|id| format!(" at item {id}"))
        .unwrap_or_default()
}

impl MenuTreeError {
    /// Create a menu not found error
    pub fn menu_not_found(id: impl Into<String>) -> Self {
        Self::MenuNotFound { id: id.into() }
    }

    /// Create an item not found error
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    /// Create an invalid content error
    pub fn invalid_content(name: impl Into<String>, source: ValidationError) -> Self {
        Self::InvalidContent {
            name: name.into(),
            source,
        }
    }

    /// Create a cyclic move error
    pub fn cyclic_move(item_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CyclicMove {
            item_id: item_id.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Create a self parenting error
    pub fn self_parenting(item_id: impl Into<String>) -> Self {
        Self::SelfParenting {
            item_id: item_id.into(),
        }
    }

    /// Create a parent menu mismatch error
    pub fn parent_menu_mismatch(parent_id: impl Into<String>, menu_id: impl Into<String>) -> Self {
        Self::ParentMenuMismatch {
            parent_id: parent_id.into(),
            menu_id: menu_id.into(),
        }
    }

    /// Create an encoding corruption error
    pub fn encoding_corrupt(
        menu_id: impl Into<String>,
        item_id: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self::EncodingCorrupt {
            menu_id: menu_id.into(),
            item_id: item_id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for `MenuNotFound` and `ItemNotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MenuNotFound { .. } | Self::ItemNotFound { .. })
    }

    /// True for caller-recoverable rejections.
    ///
    /// A validation error guarantees that nothing was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidContent { .. }
                | Self::InvalidMenu(_)
                | Self::DepthExceeded { .. }
                | Self::ChildrenExceeded { .. }
                | Self::CyclicMove { .. }
                | Self::SelfParenting { .. }
                | Self::HasChildren { .. }
                | Self::LayerDeleteViolatesChildLimit { .. }
                | Self::ParentMenuMismatch { .. }
                | Self::InvalidLayer { .. }
                | Self::LimitBelowCurrentShape { .. }
        )
    }
}
