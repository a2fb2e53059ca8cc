//! Read-only queries over a [`NestedSet`]
//!
//! Every query is a pure function of the stored bounds. Lookups by ID fail
//! with `ItemNotFound`; layer numbers are 1-based (`layer = depth + 1`) and an
//! out-of-range layer simply yields nothing.

use super::NestedSet;
use crate::models::{Item, ItemTree};
use crate::services::MenuTreeError;

impl NestedSet {
    /// 0-based depth of every item, aligned with [`NestedSet::items`]
    pub fn depths(&self) -> Vec<usize> {
        let mut open: Vec<i64> = Vec::new();

        self.items
            .iter()
            .map(|item| {
                while open.last().is_some_and(|&rgt| rgt < item.lft) {
                    open.pop();
                }
                let depth = open.len();
                open.push(item.rgt);
                depth
            })
            .collect()
    }

    fn parent_index(&self, index: usize) -> Option<usize> {
        let rgt = self.items[index].rgt;
        (0..index).rev().find(|&candidate| self.items[candidate].rgt > rgt)
    }

    fn child_indices(&self, index: usize) -> Vec<usize> {
        let end = self.subtree_end(index);
        let mut children = Vec::new();
        let mut cursor = index + 1;
        while cursor < end {
            children.push(cursor);
            cursor = self.subtree_end(cursor);
        }
        children
    }

    fn root_indices(&self) -> Vec<usize> {
        let mut roots = Vec::new();
        let mut cursor = 0;
        while cursor < self.items.len() {
            roots.push(cursor);
            cursor = self.subtree_end(cursor);
        }
        roots
    }

    pub fn parent(&self, id: &str) -> Result<Option<&Item>, MenuTreeError> {
        let index = self.require(id)?;
        Ok(self.parent_index(index).map(|parent| &self.items[parent]))
    }

    /// Direct children in insertion order
    pub fn children(&self, id: &str) -> Result<Vec<&Item>, MenuTreeError> {
        let index = self.require(id)?;
        Ok(self
            .child_indices(index)
            .into_iter()
            .map(|child| &self.items[child])
            .collect())
    }

    /// All descendants in pre-order
    pub fn descendants(&self, id: &str) -> Result<&[Item], MenuTreeError> {
        let index = self.require(id)?;
        Ok(&self.items[index + 1..self.subtree_end(index)])
    }

    /// Ancestors from the root down to the parent
    pub fn ancestors(&self, id: &str) -> Result<Vec<&Item>, MenuTreeError> {
        let index = self.require(id)?;
        let target = &self.items[index];
        Ok(self.items[..index]
            .iter()
            .filter(|candidate| candidate.rgt > target.rgt)
            .collect())
    }

    /// Number of ancestors; roots have depth 0
    pub fn depth(&self, id: &str) -> Result<usize, MenuTreeError> {
        Ok(self.ancestors(id)?.len())
    }

    /// Deepest level below `id`, relative to it (0 for a leaf)
    pub fn deepest_descendant_depth(&self, id: &str) -> Result<usize, MenuTreeError> {
        Ok(self.subtree_level_counts(id)?.len() - 1)
    }

    /// Item count per level of the subtree rooted at `id`; index 0 is `id` itself
    pub fn subtree_level_counts(&self, id: &str) -> Result<Vec<usize>, MenuTreeError> {
        let index = self.require(id)?;
        let mut counts = Vec::new();
        let mut open: Vec<i64> = Vec::new();

        for item in &self.items[index..self.subtree_end(index)] {
            while open.last().is_some_and(|&rgt| rgt < item.lft) {
                open.pop();
            }
            let level = open.len();
            if counts.len() <= level {
                counts.resize(level + 1, 0);
            }
            counts[level] += 1;
            open.push(item.rgt);
        }

        Ok(counts)
    }

    /// Items on 1-based layer `layer_no`, in pre-order
    pub fn layer(&self, layer_no: usize) -> Vec<&Item> {
        if layer_no == 0 {
            return Vec::new();
        }
        self.depths()
            .into_iter()
            .zip(&self.items)
            .filter(|(depth, _)| depth + 1 == layer_no)
            .map(|(_, item)| item)
            .collect()
    }

    pub fn layer_children_count(&self, layer_no: usize) -> usize {
        self.layer(layer_no).len()
    }

    /// Item count per layer; index 0 is layer 1
    pub fn layer_widths(&self) -> Vec<usize> {
        let mut widths = Vec::new();
        for depth in self.depths() {
            if widths.len() <= depth {
                widths.resize(depth + 1, 0);
            }
            widths[depth] += 1;
        }
        widths
    }

    /// Width of the widest layer; 0 for an empty menu
    pub fn most_children_in_any_layer(&self) -> usize {
        self.layer_widths().into_iter().max().unwrap_or(0)
    }

    /// Deepest layer number in use; 0 for an empty menu
    pub fn layer_count(&self) -> usize {
        self.layer_widths().len()
    }

    /// O(1) bound comparison once both items are located
    pub fn is_descendant_of(&self, id: &str, ancestor_id: &str) -> Result<bool, MenuTreeError> {
        let item = &self.items[self.require(id)?];
        let ancestor = &self.items[self.require(ancestor_id)?];
        Ok(item.is_descendant_of(ancestor))
    }

    pub fn roots(&self) -> Vec<&Item> {
        self.root_indices()
            .into_iter()
            .map(|root| &self.items[root])
            .collect()
    }

    pub fn first_layer_children_count(&self) -> usize {
        self.root_indices().len()
    }

    /// Nested view of `id` and everything below it
    pub fn tree(&self, id: &str) -> Result<ItemTree, MenuTreeError> {
        let index = self.require(id)?;
        Ok(self.tree_at(index))
    }

    /// Nested views of every root, in order
    pub fn forest(&self) -> Vec<ItemTree> {
        self.root_indices()
            .into_iter()
            .map(|root| self.tree_at(root))
            .collect()
    }

    fn tree_at(&self, index: usize) -> ItemTree {
        ItemTree {
            item: self.items[index].clone(),
            children: self
                .child_indices(index)
                .into_iter()
                .map(|child| self.tree_at(child))
                .collect(),
        }
    }
}
