//! Data Models
//!
//! This module contains the data structures shared by every layer of the engine:
//!
//! - `Menu` - A named tree with optional depth and per-layer width limits
//! - `Item` - One node of a menu, positioned by nested-set bounds
//! - Request/response shapes for bulk creation, updates and read views
//!
//! Parent/child relations are never stored on `Item`; they are derived from
//! the `lft`/`rgt` bounds by the encoding layer.

mod item;
mod menu;

pub use item::{
    CreatedItem, Item, ItemTree, ItemUpdate, ItemView, NewItem, Placement, ValidationError,
    MAX_ITEM_NAME_LENGTH,
};
pub use menu::{Menu, MenuUpdate, MAX_MENU_NAME_LENGTH};
