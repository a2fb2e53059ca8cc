//! In-memory MenuStore
//!
//! Hash-map backed implementation of [`MenuStore`] guarded by a tokio `RwLock`.
//! A commit takes the write lock once, validates the whole change set and only
//! then applies it, so readers never observe a half-applied mutation.
//!
//! The store can be persisted as a JSON snapshot with
//! [`InMemoryStore::save_snapshot`] and restored with
//! [`InMemoryStore::load_snapshot`].

use crate::db::{ChangeSet, MenuStore};
use crate::models::{Item, Menu};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Serializable image of a store's full contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub menus: Vec<Menu>,
    pub items: Vec<Item>,
}

#[derive(Debug, Default)]
struct StoreState {
    menus: HashMap<String, Menu>,
    /// Menu IDs in creation order
    menu_order: Vec<String>,
    items: HashMap<String, Item>,
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot.
    ///
    /// # Errors
    ///
    /// Fails on duplicate IDs or items referencing unknown menus.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let mut state = StoreState::default();

        for menu in snapshot.menus {
            if state.menus.contains_key(&menu.id) {
                bail!("duplicate menu id {} in snapshot", menu.id);
            }
            state.menu_order.push(menu.id.clone());
            state.menus.insert(menu.id.clone(), menu);
        }

        for item in snapshot.items {
            if !state.menus.contains_key(&item.menu_id) {
                bail!("item {} references unknown menu {}", item.id, item.menu_id);
            }
            if state.items.contains_key(&item.id) {
                bail!("duplicate item id {} in snapshot", item.id);
            }
            state.items.insert(item.id.clone(), item);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Copy of the current contents, items ordered by menu then `lft`
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;

        let menus: Vec<Menu> = state
            .menu_order
            .iter()
            .filter_map(|id| state.menus.get(id).cloned())
            .collect();

        let mut items: Vec<Item> = Vec::with_capacity(state.items.len());
        for menu in &menus {
            let mut owned: Vec<Item> = state
                .items
                .values()
                .filter(|item| item.menu_id == menu.id)
                .cloned()
                .collect();
            owned.sort_by_key(|item| item.lft);
            items.extend(owned);
        }

        StoreSnapshot { menus, items }
    }

    /// Write the current contents to `path` as pretty-printed JSON
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(&self.snapshot().await)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;

        tracing::debug!("Saved store snapshot to {}", path.display());
        Ok(())
    }

    /// Read a store previously written by [`InMemoryStore::save_snapshot`]
    pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("invalid snapshot in {}", path.display()))?;

        Self::from_snapshot(snapshot)
    }
}

#[async_trait]
impl MenuStore for InMemoryStore {
    async fn create_menu(&self, menu: Menu) -> Result<Menu> {
        let mut state = self.state.write().await;

        if state.menus.contains_key(&menu.id) {
            bail!("menu {} already exists", menu.id);
        }

        state.menu_order.push(menu.id.clone());
        state.menus.insert(menu.id.clone(), menu.clone());
        Ok(menu)
    }

    async fn get_menu(&self, id: &str) -> Result<Option<Menu>> {
        Ok(self.state.read().await.menus.get(id).cloned())
    }

    async fn list_menus(&self) -> Result<Vec<Menu>> {
        let state = self.state.read().await;
        Ok(state
            .menu_order
            .iter()
            .filter_map(|id| state.menus.get(id).cloned())
            .collect())
    }

    async fn update_menu(&self, menu: Menu) -> Result<Menu> {
        let mut state = self.state.write().await;

        match state.menus.get_mut(&menu.id) {
            Some(existing) => {
                *existing = menu.clone();
                Ok(menu)
            }
            None => bail!("menu {} does not exist", menu.id),
        }
    }

    async fn delete_menu(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;

        let owned = state.items.values().filter(|item| item.menu_id == id).count();
        if owned > 0 {
            bail!("menu {} still owns {} items", id, owned);
        }

        if state.menus.remove(id).is_none() {
            bail!("menu {} does not exist", id);
        }
        state.menu_order.retain(|menu_id| menu_id != id);
        Ok(())
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.state.read().await.items.get(id).cloned())
    }

    async fn items_by_menu(&self, menu_id: &str) -> Result<Vec<Item>> {
        Ok(self
            .state
            .read()
            .await
            .items
            .values()
            .filter(|item| item.menu_id == menu_id)
            .cloned()
            .collect())
    }

    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let mut state = self.state.write().await;

        // Validate everything before touching the maps
        if let Some(orphan) = changes
            .upserts
            .iter()
            .find(|item| !state.menus.contains_key(&item.menu_id))
        {
            bail!(
                "item {} references unknown menu {}",
                orphan.id,
                orphan.menu_id
            );
        }

        for id in &changes.deletes {
            state.items.remove(id);
        }
        for item in changes.upserts {
            state.items.insert(item.id.clone(), item);
        }

        Ok(())
    }
}
