//! Item Service - Structural Mutations
//!
//! This module is the mutation engine for menu items:
//!
//! - Creation (single item, root, child, nested forest)
//! - Update (rename, move inside a menu, move across menus)
//! - Deletion (single item, subtree, whole menu, descendants, whole layer)
//! - Encoding repair (`rebuild`)
//!
//! # Validate, then commit
//!
//! Every operation follows the same three steps:
//!
//! 1. Load the affected menus from the store into [`NestedSet`] snapshots
//! 2. Run the matching check from [`crate::operations::validator`]; a rejection
//!    returns before anything is modified
//! 3. Apply the change to the snapshots, diff them against the originals and
//!    hand the result to [`MenuStore::commit`] as one [`ChangeSet`]
//!
//! Domain events are broadcast only after the commit succeeded.
//!
//! # Concurrency
//!
//! The service does not lock. Callers serialize mutations per menu; reads may
//! run concurrently against the store's own snapshot isolation.

use crate::config::EngineConfig;
use crate::db::{ChangeSet, DomainEvent, ItemPosition, MenuStore};
use crate::encoding::NestedSet;
use crate::models::{CreatedItem, Item, ItemUpdate, Menu, NewItem, Placement};
use crate::operations::{self, LayerDeletePlan};
use crate::services::error::MenuTreeError;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Mutation engine for menu items
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn MenuStore>,
    config: EngineConfig,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl ItemService {
    /// Create a new ItemService with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use menutree_core::db::InMemoryStore;
    /// # use menutree_core::services::ItemService;
    /// # use std::sync::Arc;
    /// let service = ItemService::new(Arc::new(InMemoryStore::new()));
    /// ```
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        let config = EngineConfig::default();
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);

        Self {
            store,
            config,
            event_tx,
        }
    }

    /// Create a new ItemService with an explicit configuration
    pub fn with_config(store: Arc<dyn MenuStore>, config: EngineConfig) -> Result<Self, MenuTreeError> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);

        Ok(Self {
            store,
            config,
            event_tx,
        })
    }

    pub fn store(&self) -> &Arc<dyn MenuStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to domain events
    ///
    /// Returns a broadcast receiver for every event emitted by this service and
    /// by any [`crate::services::MenuService`] built on top of it.
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a domain event to all subscribers
    ///
    /// Having no subscriber is not an error.
    pub(crate) fn emit_event(&self, event: DomainEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No subscribers for domain event");
        }
    }

    /// Load a menu row and its encoding
    pub(crate) async fn load_menu(&self, menu_id: &str) -> Result<(Menu, NestedSet), MenuTreeError> {
        super::load_menu(self.store.as_ref(), menu_id).await
    }

    async fn require_item(&self, id: &str) -> Result<Item, MenuTreeError> {
        self.store
            .get_item(id)
            .await?
            .ok_or_else(|| MenuTreeError::item_not_found(id))
    }

    /// Make sure `parent_id` (if any) is an item of `set`.
    ///
    /// An existing item from another menu is reported as `ParentMenuMismatch`
    /// rather than `ItemNotFound`.
    async fn require_parent(&self, set: &NestedSet, parent_id: Option<&str>) -> Result<(), MenuTreeError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if set.contains(parent_id) {
            return Ok(());
        }
        match self.store.get_item(parent_id).await? {
            Some(_) => Err(MenuTreeError::parent_menu_mismatch(parent_id, set.menu_id())),
            None => Err(MenuTreeError::item_not_found(parent_id)),
        }
    }

    /// Diff the snapshots and commit the result as one change set
    async fn commit(&self, before: &[&NestedSet], after: &[&NestedSet]) -> Result<ChangeSet, MenuTreeError> {
        let before: Vec<Item> = before.iter().flat_map(|set| set.items().iter().cloned()).collect();
        let after: Vec<Item> = after.iter().flat_map(|set| set.items().iter().cloned()).collect();

        let changes = ChangeSet::diff(&before, &after);
        if changes.is_empty() {
            debug!("Nothing to commit");
            return Ok(changes);
        }

        debug!(
            "Committing {} upserts and {} deletes",
            changes.upserts.len(),
            changes.deletes.len()
        );
        self.store.commit(changes.clone()).await?;
        Ok(changes)
    }

    //
    // CREATE
    //

    /// Create one item as the last root of `menu_id` or the last child of `parent_id`
    ///
    /// # Errors
    ///
    /// - `MenuNotFound` / `ItemNotFound` for unknown menu or parent
    /// - `ParentMenuMismatch` if the parent belongs to another menu
    /// - `InvalidContent`, `DepthExceeded`, `ChildrenExceeded` from validation
    #[instrument(skip(self, name))]
    pub async fn create_item(
        &self,
        menu_id: &str,
        parent_id: Option<&str>,
        name: &str,
    ) -> Result<CreatedItem, MenuTreeError> {
        let (menu, mut set) = self.load_menu(menu_id).await?;
        let original = set.clone();
        self.require_parent(&set, parent_id).await?;

        let forest = [NewItem::leaf(name)];
        operations::check_forest(&menu, &set, parent_id, &forest, self.config.max_item_name_length)?;

        let created = insert_forest(&mut set, parent_id, &forest)?
            .pop()
            .ok_or_else(|| MenuTreeError::encoding_corrupt(menu_id, None, "no item was placed"))?;
        self.commit(&[&original], &[&set]).await?;

        info!("Created item {} in menu {}", created.item.id, menu_id);
        self.emit_event(DomainEvent::ItemCreated {
            item: created.item.clone(),
        });
        Ok(created)
    }

    /// Create an item as the last root of a menu
    pub async fn create_root(&self, menu_id: &str, name: &str) -> Result<CreatedItem, MenuTreeError> {
        self.create_item(menu_id, None, name).await
    }

    /// Create an item as the last child of `parent_id`, in the parent's menu
    pub async fn create_child(&self, parent_id: &str, name: &str) -> Result<CreatedItem, MenuTreeError> {
        let parent = self.require_item(parent_id).await?;
        self.create_item(&parent.menu_id, Some(parent_id), name).await
    }

    /// Create a nested forest of items in one all-or-nothing operation.
    ///
    /// The whole payload is validated before the first item is placed. Items
    /// are placed top-down in payload order, each as the last child of its
    /// parent, and written in a single commit.
    ///
    /// # Errors
    ///
    /// Any validation failure rejects the entire forest without writing. A
    /// store failure during the commit is reported as `PartialCreateFailure`;
    /// the store's own atomicity decides what, if anything, was persisted.
    #[instrument(skip(self, forest), fields(roots = forest.len()))]
    pub async fn create_forest(
        &self,
        menu_id: &str,
        parent_id: Option<&str>,
        forest: &[NewItem],
    ) -> Result<Vec<CreatedItem>, MenuTreeError> {
        let (menu, mut set) = self.load_menu(menu_id).await?;
        let original = set.clone();
        self.require_parent(&set, parent_id).await?;

        operations::check_forest(&menu, &set, parent_id, forest, self.config.max_item_name_length)?;

        let created = insert_forest(&mut set, parent_id, forest)?;
        let attempted = set.len() - original.len();

        if let Err(err) = self.commit(&[&original], &[&set]).await {
            let source = match err {
                MenuTreeError::StorageFailed(source) => source,
                other => return Err(other),
            };
            error!(
                "Bulk creation of {} items in menu {} failed: {}",
                attempted, menu_id, source
            );
            return Err(MenuTreeError::PartialCreateFailure {
                menu_id: menu_id.to_string(),
                attempted,
                source,
            });
        }

        info!("Created {} items in menu {}", attempted, menu_id);
        for_each_created(&created, &mut |entry| {
            self.emit_event(DomainEvent::ItemCreated {
                item: entry.item.clone(),
            })
        });
        Ok(created)
    }

    //
    // UPDATE
    //

    /// Apply a sparse update: rename and/or relocate an item.
    ///
    /// All checks run before the single commit. A placement equal to the
    /// current one leaves the structure untouched.
    #[instrument(skip(self, update))]
    pub async fn update_item(&self, id: &str, update: ItemUpdate) -> Result<Item, MenuTreeError> {
        let item = self.require_item(id).await?;
        let (source_menu, mut source) = self.load_menu(&item.menu_id).await?;
        let source_original = source.clone();

        if let Some(name) = &update.name {
            operations::check_item_name(name, self.config.max_item_name_length)?;
        }

        let from = ItemPosition {
            menu_id: item.menu_id.clone(),
            parent_id: source.parent(id)?.map(|parent| parent.id.clone()),
        };
        let relocation = update.placement.filter(|placement| {
            placement.menu_id != from.menu_id || placement.parent_id != from.parent_id
        });

        let mut target = None;
        if let Some(placement) = &relocation {
            if placement.menu_id == source_menu.id {
                self.move_within(&source_menu, &mut source, id, placement).await?;
            } else {
                target = Some(self.move_across(&mut source, id, placement).await?);
            }
        }

        let now = Utc::now();
        let holder = match target.as_mut() {
            Some((_, set)) => set,
            None => &mut source,
        };
        let updated = holder
            .get_mut(id)
            .ok_or_else(|| MenuTreeError::item_not_found(id))?;
        if let Some(name) = update.name.clone() {
            updated.name = name;
        }
        if update.name.is_some() || relocation.is_some() {
            updated.modified_at = now;
        }
        let updated = updated.clone();

        match &target {
            Some((original, set)) => {
                self.commit(&[&source_original, original], &[&source, set]).await?
            }
            None => self.commit(&[&source_original], &[&source]).await?,
        };

        if update.name.is_some() {
            self.emit_event(DomainEvent::ItemUpdated {
                item: updated.clone(),
            });
        }
        if let Some(placement) = relocation {
            info!(
                "Moved item {} to menu {} under {:?}",
                id, placement.menu_id, placement.parent_id
            );
            self.emit_event(DomainEvent::ItemMoved {
                item_id: id.to_string(),
                from,
                to: ItemPosition {
                    menu_id: placement.menu_id,
                    parent_id: placement.parent_id,
                },
            });
        }

        Ok(updated)
    }

    /// Relocate inside the item's own menu
    async fn move_within(
        &self,
        menu: &Menu,
        set: &mut NestedSet,
        id: &str,
        placement: &Placement,
    ) -> Result<(), MenuTreeError> {
        let parent_id = placement.parent_id.as_deref();
        if parent_id != Some(id) {
            self.require_parent(set, parent_id).await?;
        }
        let snapshot: &NestedSet = set;
        operations::check_relocation(menu, snapshot, snapshot, id, parent_id)?;

        set.detach_and_reattach(id, parent_id)?;
        set.rebuild()
    }

    /// Relocate into another menu; returns the target's original and mutated encodings
    async fn move_across(
        &self,
        source: &mut NestedSet,
        id: &str,
        placement: &Placement,
    ) -> Result<(NestedSet, NestedSet), MenuTreeError> {
        let (target_menu, mut target) = self.load_menu(&placement.menu_id).await?;
        let target_original = target.clone();
        let parent_id = placement.parent_id.as_deref();

        if parent_id != Some(id) {
            self.require_parent(&target, parent_id).await?;
        }
        operations::check_relocation(&target_menu, &target, source, id, parent_id)?;

        let mut subtree = source.extract_subtree(id)?;
        subtree.retag(&target_menu.id);
        debug!(
            "Retagged {} items from menu {} to {}",
            subtree.len(),
            source.menu_id(),
            target_menu.id
        );
        target.graft(parent_id, subtree)?;

        source.rebuild()?;
        target.rebuild()?;
        Ok((target_original, target))
    }

    /// Change an item's name
    pub async fn rename_item(&self, id: &str, name: &str) -> Result<Item, MenuTreeError> {
        self.update_item(
            id,
            ItemUpdate {
                name: Some(name.to_string()),
                placement: None,
            },
        )
        .await
    }

    /// Move an item and its subtree under `parent_id` of `menu_id` (or to its root layer)
    pub async fn move_item(
        &self,
        id: &str,
        menu_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Item, MenuTreeError> {
        self.update_item(
            id,
            ItemUpdate {
                name: None,
                placement: Some(Placement {
                    menu_id: menu_id.to_string(),
                    parent_id: parent_id.map(str::to_string),
                }),
            },
        )
        .await
    }

    //
    // DELETE
    //

    /// Delete a single childless item
    ///
    /// # Errors
    ///
    /// `HasChildren` if the item still has children; use
    /// [`ItemService::delete_subtree`] or [`ItemService::delete_layer`] instead.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> Result<(), MenuTreeError> {
        let item = self.require_item(id).await?;
        let (_, mut set) = self.load_menu(&item.menu_id).await?;
        let original = set.clone();

        let children = set.children(id)?.len();
        if children > 0 {
            return Err(MenuTreeError::HasChildren {
                item_id: id.to_string(),
                children,
            });
        }

        set.extract_subtree(id)?;
        self.commit(&[&original], &[&set]).await?;

        info!("Deleted item {} from menu {}", id, item.menu_id);
        self.emit_event(DomainEvent::ItemDeleted {
            id: id.to_string(),
            menu_id: item.menu_id,
        });
        Ok(())
    }

    /// Delete an item and all of its descendants.
    ///
    /// Returns the removed IDs, descendants ahead of their ancestors.
    #[instrument(skip(self))]
    pub async fn delete_subtree(&self, id: &str) -> Result<Vec<String>, MenuTreeError> {
        let item = self.require_item(id).await?;
        let (_, mut set) = self.load_menu(&item.menu_id).await?;
        let original = set.clone();

        let removed = deepest_first(set.extract_subtree(id)?.items());
        self.commit(&[&original], &[&set]).await?;

        info!(
            "Deleted subtree of {} ({} items) from menu {}",
            id,
            removed.len(),
            item.menu_id
        );
        self.emit_deleted(&item.menu_id, &removed);
        Ok(removed)
    }

    /// Delete every item of a menu, root subtree by root subtree.
    ///
    /// Returns the removed IDs.
    #[instrument(skip(self))]
    pub async fn delete_by_menu(&self, menu_id: &str) -> Result<Vec<String>, MenuTreeError> {
        let (_, mut set) = self.load_menu(menu_id).await?;
        let original = set.clone();

        let roots: Vec<String> = set.roots().iter().map(|root| root.id.clone()).collect();
        let mut removed = Vec::with_capacity(set.len());
        for root in roots {
            removed.extend(deepest_first(set.extract_subtree(&root)?.items()));
        }

        self.commit(&[&original], &[&set]).await?;

        info!("Deleted {} items from menu {}", removed.len(), menu_id);
        self.emit_deleted(menu_id, &removed);
        Ok(removed)
    }

    /// Delete every descendant of an item, keeping the item itself.
    ///
    /// Returns the removed IDs.
    #[instrument(skip(self))]
    pub async fn delete_descendants(&self, id: &str) -> Result<Vec<String>, MenuTreeError> {
        let item = self.require_item(id).await?;
        let (_, mut set) = self.load_menu(&item.menu_id).await?;
        let original = set.clone();

        let children: Vec<String> = set.children(id)?.iter().map(|child| child.id.clone()).collect();
        let mut removed = Vec::new();
        for child in children {
            removed.extend(deepest_first(set.extract_subtree(&child)?.items()));
        }

        self.commit(&[&original], &[&set]).await?;

        info!("Deleted {} descendants of {}", removed.len(), id);
        self.emit_deleted(&item.menu_id, &removed);
        Ok(removed)
    }

    /// Delete layer `layer_no` (1-based), reparenting each layer item's children
    /// to that item's parent. Relative order of the moved children is kept.
    ///
    /// # Errors
    ///
    /// - `InvalidLayer` for layer 0
    /// - `LayerDeleteViolatesChildLimit` if any destination parent would end
    ///   with more children than the menu allows; nothing is modified
    #[instrument(skip(self))]
    pub async fn delete_layer(&self, menu_id: &str, layer_no: usize) -> Result<LayerDeletePlan, MenuTreeError> {
        let (menu, mut set) = self.load_menu(menu_id).await?;
        let original = set.clone();

        let plan = operations::plan_layer_delete(&menu, &set, layer_no)?;
        if plan.is_empty() {
            debug!("Layer {} of menu {} is empty", layer_no, menu_id);
            return Ok(plan);
        }

        for (child_id, parent_id) in &plan.reattachments {
            set.detach_and_reattach(child_id, parent_id.as_deref())?;
        }
        for id in &plan.removed {
            let leftover = set.extract_subtree(id)?;
            if leftover.len() > 1 {
                return Err(MenuTreeError::encoding_corrupt(
                    menu_id,
                    Some(id),
                    "layer item still has children after reparenting",
                ));
            }
        }
        set.rebuild()?;

        self.commit(&[&original], &[&set]).await?;

        info!(
            "Deleted layer {} of menu {} ({} items, {} reparented)",
            layer_no,
            menu_id,
            plan.removed.len(),
            plan.reattachments.len()
        );
        self.emit_event(DomainEvent::LayerDeleted {
            menu_id: menu_id.to_string(),
            layer: layer_no,
            removed: plan.removed.clone(),
        });
        Ok(plan)
    }

    fn emit_deleted(&self, menu_id: &str, removed: &[String]) {
        for id in removed {
            self.emit_event(DomainEvent::ItemDeleted {
                id: id.clone(),
                menu_id: menu_id.to_string(),
            });
        }
    }

    //
    // REPAIR
    //

    /// Recompute a menu's bounds densely and persist the ones that changed.
    ///
    /// Returns the number of rewritten items.
    #[instrument(skip(self))]
    pub async fn rebuild(&self, menu_id: &str) -> Result<usize, MenuTreeError> {
        let (_, mut set) = self.load_menu(menu_id).await?;
        let original = set.clone();

        set.rebuild()?;
        let changes = self.commit(&[&original], &[&set]).await?;

        if changes.is_empty() {
            debug!("Menu {} was already compact", menu_id);
        } else {
            warn!(
                "Rebuilt menu {}: {} items had stale bounds",
                menu_id,
                changes.upserts.len()
            );
        }
        self.emit_event(DomainEvent::MenuRebuilt {
            menu_id: menu_id.to_string(),
        });
        Ok(changes.upserts.len())
    }
}

/// Place a validated forest into `set` and describe what was created
fn insert_forest(
    set: &mut NestedSet,
    parent_id: Option<&str>,
    forest: &[NewItem],
) -> Result<Vec<CreatedItem>, MenuTreeError> {
    let depth = match parent_id {
        Some(parent_id) => set.depth(parent_id)? + 1,
        None => 0,
    };

    let mut created = forest
        .iter()
        .map(|node| insert_node(set, parent_id, depth, node))
        .collect::<Result<Vec<_>, _>>()?;

    // Later appends shift earlier bounds; report the final rows
    for entry in &mut created {
        refresh(entry, set);
    }
    Ok(created)
}

fn insert_node(
    set: &mut NestedSet,
    parent_id: Option<&str>,
    depth: usize,
    node: &NewItem,
) -> Result<CreatedItem, MenuTreeError> {
    let item = Item::new(set.menu_id(), node.name.clone());
    let id = item.id.clone();
    set.append(parent_id, item.clone())?;

    let created_descendants = node
        .children
        .iter()
        .map(|child| insert_node(set, Some(id.as_str()), depth + 1, child))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreatedItem {
        item,
        depth,
        parent_id: parent_id.map(str::to_string),
        created_descendants,
    })
}

fn refresh(entry: &mut CreatedItem, set: &NestedSet) {
    if let Some(current) = set.get(&entry.item.id) {
        entry.item = current.clone();
    }
    for child in &mut entry.created_descendants {
        refresh(child, set);
    }
}

fn for_each_created(created: &[CreatedItem], visit: &mut impl FnMut(&CreatedItem)) {
    for entry in created {
        visit(entry);
        for_each_created(&entry.created_descendants, visit);
    }
}

/// IDs of a pre-ordered block with every descendant ahead of its ancestors
fn deepest_first(items: &[Item]) -> Vec<String> {
    items.iter().rev().map(|item| item.id.clone()).collect()
}

#[cfg(test)]
#[path = "item_service_test.rs"]
mod item_service_test;
