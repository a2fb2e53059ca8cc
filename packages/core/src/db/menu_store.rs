//! MenuStore Trait - Storage Abstraction Layer
//!
//! This module defines the `MenuStore` trait that abstracts persistence of menus
//! and items. The engine reads whole menus as snapshots, computes every change
//! in memory, and hands the result back as a single [`ChangeSet`].
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so that embedded and networked
//!    backends fit behind the same trait
//! 2. **Ownership Semantics**: Methods take ownership of values to avoid
//!    unnecessary cloning (caller can clone if needed)
//! 3. **Error Handling**: Uses `anyhow::Result` for flexible error context;
//!    services wrap failures into `MenuTreeError::StorageFailed`
//! 4. **Atomic Commit**: `commit` applies every upsert and delete of a change
//!    set or none of them
//!
//! # Examples
//!
//! ```rust,no_run
//! use menutree_core::db::{InMemoryStore, MenuStore};
//! use menutree_core::models::Menu;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn MenuStore> = Arc::new(InMemoryStore::new());
//!     let menu = store.create_menu(Menu::new("Main", Some(3), None)).await?;
//!     assert!(store.items_by_menu(&menu.id).await?.is_empty());
//!     Ok(())
//! }
//! ```

use crate::models::{Item, Menu};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Row-level writes produced by one mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Items to insert or overwrite (matched by `id`)
    pub upserts: Vec<Item>,

    /// IDs of items to remove
    pub deletes: Vec<String>,
}

impl ChangeSet {
    /// Compute the writes that turn `before` into `after`.
    ///
    /// Items present in `after` whose row differs from (or is absent in)
    /// `before` become upserts; IDs only present in `before` become deletes.
    /// Ordering follows the input slices so commits are deterministic.
    pub fn diff(before: &[Item], after: &[Item]) -> Self {
        let previous: HashMap<&str, &Item> =
            before.iter().map(|item| (item.id.as_str(), item)).collect();
        let remaining: HashSet<&str> = after.iter().map(|item| item.id.as_str()).collect();

        let upserts = after
            .iter()
            .filter(|item| previous.get(item.id.as_str()) != Some(item))
            .cloned()
            .collect();

        let deletes = before
            .iter()
            .filter(|item| !remaining.contains(item.id.as_str()))
            .map(|item| item.id.clone())
            .collect();

        Self { upserts, deletes }
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }
}

/// Abstraction layer for menu and item persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage in async contexts where
/// futures may be moved between threads.
///
/// # Concurrency
///
/// The engine assumes a single writer per menu. Implementations only need to
/// make `commit` atomic; they do not need to detect conflicting writers.
#[async_trait]
pub trait MenuStore: Send + Sync {
    //
    // MENUS
    //

    /// Persist a new menu
    async fn create_menu(&self, menu: Menu) -> Result<Menu>;

    /// Get menu by ID
    ///
    /// - `Ok(Some(menu))` if the menu exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get_menu(&self, id: &str) -> Result<Option<Menu>>;

    /// All menus, in creation order
    async fn list_menus(&self) -> Result<Vec<Menu>>;

    /// Overwrite an existing menu row
    async fn update_menu(&self, menu: Menu) -> Result<Menu>;

    /// Remove a menu row.
    ///
    /// # Errors
    ///
    /// Fails if the menu still owns items; callers empty the menu first.
    async fn delete_menu(&self, id: &str) -> Result<()>;

    //
    // ITEMS
    //

    /// Get item by ID
    async fn get_item(&self, id: &str) -> Result<Option<Item>>;

    /// All items owned by a menu, in no particular order
    async fn items_by_menu(&self, menu_id: &str) -> Result<Vec<Item>>;

    /// Apply a change set atomically.
    ///
    /// # Errors
    ///
    /// Fails without applying anything if an upsert references an unknown menu.
    async fn commit(&self, changes: ChangeSet) -> Result<()>;
}
