//! Menu Service - Menu Lifecycle
//!
//! Creation, updates and cascading deletion of menus. Limit updates are
//! checked against the menu's current shape here, so that mutations in
//! [`ItemService`] never have to revalidate existing items.

use crate::db::DomainEvent;
use crate::models::{Menu, MenuUpdate};
use crate::services::error::MenuTreeError;
use crate::services::ItemService;
use chrono::Utc;
use tracing::{info, instrument};

/// Menu lifecycle operations, sharing store and event channel with an [`ItemService`]
#[derive(Clone)]
pub struct MenuService {
    items: ItemService,
}

impl MenuService {
    pub fn new(items: ItemService) -> Self {
        Self { items }
    }

    pub fn item_service(&self) -> &ItemService {
        &self.items
    }

    /// Create an empty menu
    ///
    /// # Errors
    ///
    /// `InvalidMenu` if the name is blank or too long.
    #[instrument(skip(self))]
    pub async fn create_menu(
        &self,
        name: &str,
        max_depth: Option<u32>,
        max_children: Option<u32>,
    ) -> Result<Menu, MenuTreeError> {
        let menu = Menu::new(name, max_depth, max_children);
        menu.validate(self.items.config().max_menu_name_length)?;

        let menu = self.items.store().create_menu(menu).await?;

        info!("Created menu {} ({})", menu.id, menu.name);
        self.items.emit_event(DomainEvent::MenuCreated { menu: menu.clone() });
        Ok(menu)
    }

    pub async fn get_menu(&self, id: &str) -> Result<Menu, MenuTreeError> {
        self.items
            .store()
            .get_menu(id)
            .await?
            .ok_or_else(|| MenuTreeError::menu_not_found(id))
    }

    /// All menus in creation order
    pub async fn list_menus(&self) -> Result<Vec<Menu>, MenuTreeError> {
        Ok(self.items.store().list_menus().await?)
    }

    /// Apply a sparse update to a menu's name and limits.
    ///
    /// # Errors
    ///
    /// - `InvalidMenu` for a blank or too long name
    /// - `LimitBelowCurrentShape` if a new `max_depth` is below the deepest
    ///   layer in use, or a new `max_children` below the widest layer
    #[instrument(skip(self, update))]
    pub async fn update_menu(&self, id: &str, update: MenuUpdate) -> Result<Menu, MenuTreeError> {
        let (mut menu, set) = self.items.load_menu(id).await?;

        if let Some(name) = update.name {
            menu.name = name;
            menu.validate(self.items.config().max_menu_name_length)?;
        }

        if let Some(max_depth) = update.max_depth {
            let current = set.layer_count();
            if let Some(requested) = max_depth.filter(|&requested| (requested as usize) < current) {
                return Err(MenuTreeError::LimitBelowCurrentShape {
                    menu_id: id.to_string(),
                    field: "max_depth",
                    requested,
                    current,
                });
            }
            menu.max_depth = max_depth;
        }

        if let Some(max_children) = update.max_children {
            let current = set.most_children_in_any_layer();
            if let Some(requested) = max_children.filter(|&requested| (requested as usize) < current) {
                return Err(MenuTreeError::LimitBelowCurrentShape {
                    menu_id: id.to_string(),
                    field: "max_children",
                    requested,
                    current,
                });
            }
            menu.max_children = max_children;
        }

        menu.modified_at = Utc::now();
        let menu = self.items.store().update_menu(menu).await?;

        info!("Updated menu {}", id);
        self.items.emit_event(DomainEvent::MenuUpdated { menu: menu.clone() });
        Ok(menu)
    }

    /// Delete a menu and every item it owns.
    ///
    /// Returns the IDs of the removed items.
    #[instrument(skip(self))]
    pub async fn delete_menu(&self, id: &str) -> Result<Vec<String>, MenuTreeError> {
        let removed = self.items.delete_by_menu(id).await?;
        self.items.store().delete_menu(id).await?;

        info!("Deleted menu {} with {} items", id, removed.len());
        self.items.emit_event(DomainEvent::MenuDeleted { id: id.to_string() });
        Ok(removed)
    }

    /// Deepest layer number in use; 0 for an empty menu
    pub async fn menu_depth(&self, id: &str) -> Result<usize, MenuTreeError> {
        let (_, set) = self.items.load_menu(id).await?;
        Ok(set.layer_count())
    }
}

#[cfg(test)]
#[path = "menu_service_test.rs"]
mod menu_service_test;
