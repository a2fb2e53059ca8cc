//! Nested-Set Encoding
//!
//! A [`NestedSet`] holds every item of one menu, ordered by `lft`, which is a
//! pre-order walk of the menu's forest. Parent/child relations are derived from
//! the bounds alone:
//!
//! - `A` is an ancestor of `B` iff `A.lft < B.lft && B.rgt < A.rgt`
//! - the subtree of `A` is the contiguous run of items after `A` whose `lft`
//!   is below `A.rgt`
//!
//! Mutations keep that invariant incrementally (open or close a gap, then
//! offset a block). Bounds may contain gaps after subtrees leave the menu;
//! [`NestedSet::rebuild`] renumbers them densely from 1 without changing the
//! structure. Read-only queries live in [`query`].

pub mod query;

use crate::models::Item;
use crate::services::MenuTreeError;
use std::collections::HashSet;

/// A detached subtree: its root followed by its descendants in pre-order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtree {
    items: Vec<Item>,
}

impl Subtree {
    /// Wrap a single unplaced item so it can be grafted like any subtree
    pub fn single(mut item: Item) -> Self {
        item.lft = 0;
        item.rgt = 1;
        Self { items: vec![item] }
    }

    pub fn root(&self) -> &Item {
        &self.items[0]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reassign the owning menu of every item in the subtree in one pass
    pub fn retag(&mut self, menu_id: &str) {
        for item in &mut self.items {
            item.menu_id = menu_id.to_string();
        }
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// All items of one menu, positioned by nested-set bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedSet {
    menu_id: String,
    /// Sorted by `lft` (pre-order)
    items: Vec<Item>,
}

impl NestedSet {
    /// Create an empty encoding for a menu
    pub fn new(menu_id: impl Into<String>) -> Self {
        Self {
            menu_id: menu_id.into(),
            items: Vec::new(),
        }
    }

    /// Build an encoding from stored rows, in any order.
    ///
    /// # Errors
    ///
    /// Returns `EncodingCorrupt` if the bounds do not describe a forest or if
    /// a row is owned by another menu.
    pub fn from_items(menu_id: impl Into<String>, mut items: Vec<Item>) -> Result<Self, MenuTreeError> {
        items.sort_by_key(|item| item.lft);
        let set = Self {
            menu_id: menu_id.into(),
            items,
        };
        set.check()?;
        Ok(set)
    }

    pub fn menu_id(&self) -> &str {
        &self.menu_id
    }

    /// Items in pre-order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.position(id).map(|index| &self.items[index])
    }

    /// Mutable access to an item's content. Bounds must not be touched.
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.position(id).map(move |index| &mut self.items[index])
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub(crate) fn require(&self, id: &str) -> Result<usize, MenuTreeError> {
        self.position(id)
            .ok_or_else(|| MenuTreeError::item_not_found(id))
    }

    /// Index one past the last descendant of `index`
    pub(crate) fn subtree_end(&self, index: usize) -> usize {
        let rgt = self.items[index].rgt;
        index + 1 + self.items[index + 1..].partition_point(|item| item.lft < rgt)
    }

    fn corrupt(&self, item_id: Option<&str>, reason: impl Into<String>) -> MenuTreeError {
        let err = MenuTreeError::encoding_corrupt(&self.menu_id, item_id, reason);
        tracing::error!("{}", err);
        err
    }

    /// Verify that the bounds describe a forest owned by this menu.
    ///
    /// Checks, in one sweep over the `lft` order: ownership, non-empty
    /// intervals, unique bound values, unique IDs, and that every interval is
    /// either nested in or disjoint from the ones before it.
    pub fn check(&self) -> Result<(), MenuTreeError> {
        let mut bounds = HashSet::with_capacity(self.items.len() * 2);
        let mut ids = HashSet::with_capacity(self.items.len());
        let mut open: Vec<&Item> = Vec::new();

        for item in &self.items {
            if item.menu_id != self.menu_id {
                return Err(self.corrupt(
                    Some(&item.id),
                    format!("item is owned by menu {}", item.menu_id),
                ));
            }
            if item.lft >= item.rgt {
                return Err(self.corrupt(
                    Some(&item.id),
                    format!("empty interval [{}, {}]", item.lft, item.rgt),
                ));
            }
            if !ids.insert(item.id.as_str()) {
                return Err(self.corrupt(Some(&item.id), "duplicate item"));
            }
            if !bounds.insert(item.lft) || !bounds.insert(item.rgt) {
                return Err(self.corrupt(Some(&item.id), "bound value used twice"));
            }

            while open.last().is_some_and(|top| top.rgt < item.lft) {
                open.pop();
            }
            if let Some(top) = open.last() {
                if item.rgt > top.rgt {
                    return Err(self.corrupt(
                        Some(&item.id),
                        format!("interval overlaps item {}", top.id),
                    ));
                }
            }
            open.push(item);
        }

        Ok(())
    }

    /// Recompute every bound from the current structure.
    ///
    /// Bounds become dense (`1..=2n`) in pre-order; structure and sibling
    /// order are unchanged. Applying it twice yields the same bounds as once.
    pub fn rebuild(&mut self) -> Result<(), MenuTreeError> {
        self.check()?;

        let mut counter = 0i64;
        // (index, original rgt) of items whose right bound is not assigned yet
        let mut open: Vec<(usize, i64)> = Vec::new();

        for index in 0..self.items.len() {
            let lft = self.items[index].lft;
            let rgt = self.items[index].rgt;

            while let Some(&(closing, old_rgt)) = open.last() {
                if old_rgt > lft {
                    break;
                }
                counter += 1;
                self.items[closing].rgt = counter;
                open.pop();
            }

            counter += 1;
            self.items[index].lft = counter;
            open.push((index, rgt));
        }

        while let Some((closing, _)) = open.pop() {
            counter += 1;
            self.items[closing].rgt = counter;
        }

        tracing::debug!(
            "Rebuilt encoding of menu {} ({} items)",
            self.menu_id,
            self.items.len()
        );
        Ok(())
    }

    /// Insert `item` as the last child of `parent_id`, or as the last root.
    ///
    /// Bounds are assigned incrementally; when the shifted bounds would not
    /// fit the integer range the encoding is rebuilt and the insert retried.
    pub fn append(&mut self, parent_id: Option<&str>, item: Item) -> Result<(), MenuTreeError> {
        if item.menu_id != self.menu_id {
            return Err(self.corrupt(
                Some(&item.id),
                format!("cannot append an item owned by menu {}", item.menu_id),
            ));
        }
        self.graft(parent_id, Subtree::single(item))
    }

    /// Remove an item and its descendants as one contiguous block.
    ///
    /// The gap is closed immediately so the remaining bounds stay consistent.
    pub fn extract_subtree(&mut self, id: &str) -> Result<Subtree, MenuTreeError> {
        let start = self.require(id)?;
        let end = self.subtree_end(start);

        let items: Vec<Item> = self.items.drain(start..end).collect();
        let rgt = items[0].rgt;
        let width = items[0].width();

        for item in &mut self.items {
            if item.lft > rgt {
                item.lft -= width;
            }
            if item.rgt > rgt {
                item.rgt -= width;
            }
        }

        Ok(Subtree { items })
    }

    /// Insert a detached subtree as the last child of `parent_id`, or as the last root.
    ///
    /// Relative order and depths inside the subtree are preserved. Every item
    /// of the subtree must already be owned by this menu (see [`Subtree::retag`]).
    pub fn graft(&mut self, parent_id: Option<&str>, subtree: Subtree) -> Result<(), MenuTreeError> {
        if subtree.is_empty() {
            return Err(self.corrupt(None, "cannot graft an empty subtree"));
        }
        if let Some(foreign) = subtree.items.iter().find(|item| item.menu_id != self.menu_id) {
            return Err(self.corrupt(
                Some(&foreign.id),
                format!("subtree item still owned by menu {}", foreign.menu_id),
            ));
        }
        if let Some(duplicate) = subtree.items.iter().find(|item| self.contains(&item.id)) {
            return Err(self.corrupt(Some(&duplicate.id), "item is already placed"));
        }

        let subtree = match self.try_graft(parent_id, subtree)? {
            None => return Ok(()),
            Some(rejected) => rejected,
        };

        tracing::warn!(
            "Incremental graft does not fit menu {} bounds, rebuilding",
            self.menu_id
        );
        self.rebuild()?;

        match self.try_graft(parent_id, subtree)? {
            None => Ok(()),
            Some(rejected) => Err(self.corrupt(
                Some(&rejected.root().id),
                "no room for subtree after rebuild",
            )),
        }
    }

    /// Returns the subtree back when the bounds cannot be shifted in place
    fn try_graft(&mut self, parent_id: Option<&str>, mut subtree: Subtree) -> Result<Option<Subtree>, MenuTreeError> {
        let width = subtree.root().width();

        let (anchor, opens_gap) = match parent_id {
            Some(parent_id) => {
                let parent = self.require(parent_id)?;
                if !self.can_shift(width) {
                    return Ok(Some(subtree));
                }
                (self.items[parent].rgt, true)
            }
            None => match self.items.iter().map(|item| item.rgt).max() {
                Some(max_rgt) => match max_rgt.checked_add(1) {
                    Some(anchor) => (anchor, false),
                    None => return Ok(Some(subtree)),
                },
                None => (1, false),
            },
        };

        let offset = anchor - subtree.root().lft;
        let fits = subtree.items.iter().all(|item| {
            item.lft.checked_add(offset).is_some() && item.rgt.checked_add(offset).is_some()
        });
        if !fits {
            return Ok(Some(subtree));
        }

        if opens_gap {
            self.shift_from(anchor, width);
        }
        for item in &mut subtree.items {
            item.lft += offset;
            item.rgt += offset;
        }

        let at = self.items.partition_point(|item| item.lft < anchor);
        self.items.splice(at..at, subtree.items);
        Ok(None)
    }

    fn can_shift(&self, delta: i64) -> bool {
        self.items
            .iter()
            .all(|item| item.rgt.checked_add(delta).is_some())
    }

    /// Move every bound at or above `from` up by `delta`
    fn shift_from(&mut self, from: i64, delta: i64) {
        for item in &mut self.items {
            if item.lft >= from {
                item.lft += delta;
            }
            if item.rgt >= from {
                item.rgt += delta;
            }
        }
    }

    /// Move an item's subtree under `new_parent` (or to the root layer) as its last child.
    ///
    /// # Errors
    ///
    /// `EncodingCorrupt` if `new_parent` is the item itself or one of its
    /// descendants; callers validate relocations before reaching this point.
    pub fn detach_and_reattach(&mut self, id: &str, new_parent: Option<&str>) -> Result<(), MenuTreeError> {
        let index = self.require(id)?;

        if let Some(parent_id) = new_parent {
            let parent = self.require(parent_id)?;
            if parent == index || self.items[parent].is_descendant_of(&self.items[index]) {
                return Err(self.corrupt(
                    Some(id),
                    format!("cannot reattach under {parent_id}, it is inside the moved subtree"),
                ));
            }
        }

        let subtree = self.extract_subtree(id)?;
        self.graft(new_parent, subtree)
    }
}
