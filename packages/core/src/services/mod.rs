//! Business Services
//!
//! This module contains the async services built on a [`MenuStore`]:
//!
//! - `ItemService` - Structural mutations (create, move, delete, rebuild)
//! - `MenuService` - Menu lifecycle and limit updates
//! - `QueryService` - Read-only views over stored menus
//!
//! Services load menus into [`NestedSet`] snapshots, validate with
//! [`crate::operations`], and write back through a single commit.

pub mod error;
pub mod item_service;
pub mod menu_service;
pub mod query_service;

pub use error::MenuTreeError;
pub use item_service::ItemService;
pub use menu_service::MenuService;
pub use query_service::QueryService;

use crate::db::MenuStore;
use crate::encoding::NestedSet;
use crate::models::Menu;

/// Load a menu row and build its encoding from the stored items
pub(crate) async fn load_menu(store: &dyn MenuStore, menu_id: &str) -> Result<(Menu, NestedSet), MenuTreeError> {
    let menu = store
        .get_menu(menu_id)
        .await?
        .ok_or_else(|| MenuTreeError::menu_not_found(menu_id))?;
    let items = store.items_by_menu(menu_id).await?;
    let set = NestedSet::from_items(menu_id, items)?;
    Ok((menu, set))
}
