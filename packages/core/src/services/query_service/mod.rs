//! Query Service - Store-Backed Reads
//!
//! Thin async layer over the pure queries in [`crate::encoding::query`]. Each
//! call loads the relevant menu from the store, so results always reflect the
//! last committed state. Unknown menus and items fail with `NotFound`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use menutree_core::db::InMemoryStore;
//! use menutree_core::services::QueryService;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let queries = QueryService::new(store);
//!
//! let tree = queries.menu_tree("menu-id").await?;
//! println!("{} roots", tree.len());
//! # Ok(())
//! # }
//! ```

use crate::db::MenuStore;
use crate::encoding::NestedSet;
use crate::models::{Item, ItemTree, ItemView};
use crate::services::error::MenuTreeError;
use std::sync::Arc;

/// Read-only views over stored menus
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn MenuStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    async fn menu_set(&self, menu_id: &str) -> Result<NestedSet, MenuTreeError> {
        let (_, set) = super::load_menu(self.store.as_ref(), menu_id).await?;
        Ok(set)
    }

    /// Encoding of the menu that owns `id`
    async fn owning_set(&self, id: &str) -> Result<NestedSet, MenuTreeError> {
        let item = self
            .store
            .get_item(id)
            .await?
            .ok_or_else(|| MenuTreeError::item_not_found(id))?;
        self.menu_set(&item.menu_id).await
    }

    /// Item with its derived depth and parent
    pub async fn get_item(&self, id: &str) -> Result<ItemView, MenuTreeError> {
        let set = self.owning_set(id).await?;
        let parent_id = set.parent(id)?.map(|parent| parent.id.clone());
        let depth = set.depth(id)?;
        let item = set
            .get(id)
            .cloned()
            .ok_or_else(|| MenuTreeError::item_not_found(id))?;

        Ok(ItemView {
            item,
            depth,
            parent_id,
        })
    }

    pub async fn parent(&self, id: &str) -> Result<Option<Item>, MenuTreeError> {
        let set = self.owning_set(id).await?;
        Ok(set.parent(id)?.cloned())
    }

    pub async fn children(&self, id: &str) -> Result<Vec<Item>, MenuTreeError> {
        let set = self.owning_set(id).await?;
        Ok(set.children(id)?.into_iter().cloned().collect())
    }

    /// Descendants in pre-order
    pub async fn descendants(&self, id: &str) -> Result<Vec<Item>, MenuTreeError> {
        let set = self.owning_set(id).await?;
        Ok(set.descendants(id)?.to_vec())
    }

    /// Ancestors from the root down to the parent
    pub async fn ancestors(&self, id: &str) -> Result<Vec<Item>, MenuTreeError> {
        let set = self.owning_set(id).await?;
        Ok(set.ancestors(id)?.into_iter().cloned().collect())
    }

    pub async fn depth(&self, id: &str) -> Result<usize, MenuTreeError> {
        self.owning_set(id).await?.depth(id)
    }

    pub async fn deepest_descendant_depth(&self, id: &str) -> Result<usize, MenuTreeError> {
        self.owning_set(id).await?.deepest_descendant_depth(id)
    }

    /// True if `id` lies strictly inside `ancestor_id`'s subtree.
    ///
    /// Items of different menus are never related.
    pub async fn is_descendant_of(&self, id: &str, ancestor_id: &str) -> Result<bool, MenuTreeError> {
        let item = self
            .store
            .get_item(id)
            .await?
            .ok_or_else(|| MenuTreeError::item_not_found(id))?;
        let ancestor = self
            .store
            .get_item(ancestor_id)
            .await?
            .ok_or_else(|| MenuTreeError::item_not_found(ancestor_id))?;
        Ok(item.is_descendant_of(&ancestor))
    }

    /// Nested fragment rooted at `id`
    pub async fn children_tree(&self, id: &str) -> Result<ItemTree, MenuTreeError> {
        self.owning_set(id).await?.tree(id)
    }

    /// Every root of a menu as a nested fragment
    pub async fn menu_tree(&self, menu_id: &str) -> Result<Vec<ItemTree>, MenuTreeError> {
        Ok(self.menu_set(menu_id).await?.forest())
    }

    pub async fn roots(&self, menu_id: &str) -> Result<Vec<Item>, MenuTreeError> {
        let set = self.menu_set(menu_id).await?;
        Ok(set.roots().into_iter().cloned().collect())
    }

    /// Items on 1-based layer `layer_no`; empty when the layer does not exist
    pub async fn layer(&self, menu_id: &str, layer_no: usize) -> Result<Vec<Item>, MenuTreeError> {
        let set = self.menu_set(menu_id).await?;
        Ok(set.layer(layer_no).into_iter().cloned().collect())
    }

    pub async fn layer_children_count(&self, menu_id: &str, layer_no: usize) -> Result<usize, MenuTreeError> {
        Ok(self.menu_set(menu_id).await?.layer_children_count(layer_no))
    }

    pub async fn most_children_in_any_layer(&self, menu_id: &str) -> Result<usize, MenuTreeError> {
        Ok(self.menu_set(menu_id).await?.most_children_in_any_layer())
    }

    pub async fn first_layer_children_count(&self, menu_id: &str) -> Result<usize, MenuTreeError> {
        Ok(self.menu_set(menu_id).await?.first_layer_children_count())
    }

    /// Deepest layer number in use; 0 for an empty menu
    pub async fn menu_depth(&self, menu_id: &str) -> Result<usize, MenuTreeError> {
        Ok(self.menu_set(menu_id).await?.layer_count())
    }
}
