//! Constraint Validator
//!
//! Dry-run checks for every structural proposal. Each function inspects a
//! [`NestedSet`] snapshot and the target [`Menu`]'s limits and either returns
//! `Ok` or the first violation found. Callers must not mutate anything until a
//! check has passed, which is what makes bulk operations all-or-nothing.
//!
//! Layer numbers in errors are 1-based (`layer = depth + 1`).

use crate::encoding::NestedSet;
use crate::models::{Item, Menu, NewItem};
use crate::services::MenuTreeError;
use tracing::debug;

/// Reject names that are blank or longer than `max_length` characters
pub fn check_item_name(name: &str, max_length: usize) -> Result<(), MenuTreeError> {
    Item::validate_name(name, max_length).map_err(|source| MenuTreeError::invalid_content(name, source))
}

fn check_depth(menu: &Menu, layer: usize) -> Result<(), MenuTreeError> {
    if menu.exceeds_depth(layer) {
        debug!("Layer {} is below max depth of menu {}", layer, menu.id);
        return Err(MenuTreeError::DepthExceeded {
            menu_id: menu.id.clone(),
            max_depth: menu.max_depth.unwrap_or_default(),
            layer,
        });
    }
    Ok(())
}

fn check_children(menu: &Menu, layer: usize, count: usize) -> Result<(), MenuTreeError> {
    if menu.exceeds_children(count) {
        debug!(
            "Layer {} of menu {} would hold {} items",
            layer, menu.id, count
        );
        return Err(MenuTreeError::ChildrenExceeded {
            menu_id: menu.id.clone(),
            max_children: menu.max_children.unwrap_or_default(),
            layer,
            count,
        });
    }
    Ok(())
}

/// Check moving `item_id` (with its whole subtree) under `target_parent` of `target`.
///
/// `source` is the snapshot currently holding the item; for a move inside one
/// menu pass the same set twice. Checks run in this order:
///
/// 1. `SelfParenting` if the item would become its own parent
/// 2. `ItemNotFound` if the parent is not part of `target`
/// 3. `CyclicMove` if the parent lies inside the moved subtree
/// 4. `DepthExceeded` if the subtree's deepest item would land below `max_depth`
/// 5. `ChildrenExceeded` if any layer the subtree lands on would outgrow
///    `max_children`; items of the subtree already counted in a layer of the
///    same menu are discounted first
pub fn check_relocation(
    target_menu: &Menu,
    target: &NestedSet,
    source: &NestedSet,
    item_id: &str,
    target_parent: Option<&str>,
) -> Result<(), MenuTreeError> {
    let levels = source.subtree_level_counts(item_id)?;
    let same_menu = source.menu_id() == target.menu_id();

    let new_depth = match target_parent {
        Some(parent_id) if parent_id == item_id => {
            return Err(MenuTreeError::self_parenting(item_id));
        }
        Some(parent_id) => {
            let parent_depth = target.depth(parent_id)?;
            if same_menu && target.is_descendant_of(parent_id, item_id)? {
                return Err(MenuTreeError::cyclic_move(item_id, parent_id));
            }
            parent_depth + 1
        }
        None => 0,
    };

    check_depth(target_menu, new_depth + levels.len())?;

    if target_menu.max_children.is_some() {
        let mut widths = target.layer_widths();
        if same_menu {
            let current_depth = source.depth(item_id)?;
            for (level, count) in levels.iter().enumerate() {
                widths[current_depth + level] -= count;
            }
        }

        for (level, count) in levels.iter().enumerate() {
            let depth = new_depth + level;
            let total = widths.get(depth).copied().unwrap_or(0) + count;
            check_children(target_menu, depth + 1, total)?;
        }
    }

    debug!(
        "Relocation of {} into menu {} at depth {} is admissible",
        item_id, target_menu.id, new_depth
    );
    Ok(())
}

/// Running per-layer item counts for a bulk insertion
struct LayerTally<'a> {
    menu: &'a Menu,
    /// Index = depth; seeded with the persisted layer widths
    counts: Vec<usize>,
    max_name_length: usize,
}

impl LayerTally<'_> {
    fn visit(&mut self, node: &NewItem, depth: usize) -> Result<(), MenuTreeError> {
        let layer = depth + 1;
        check_depth(self.menu, layer)?;

        if self.counts.len() <= depth {
            self.counts.resize(depth + 1, 0);
        }
        self.counts[depth] += 1;
        check_children(self.menu, layer, self.counts[depth])?;

        check_item_name(&node.name, self.max_name_length)?;

        for child in &node.children {
            self.visit(child, depth + 1)?;
        }
        Ok(())
    }
}

/// Check inserting a forest of new items under `parent_id` (or as roots).
///
/// Walks the payload depth-first. Layer counts accumulate across the whole
/// forest, so N new siblings are checked against the persisted width plus
/// every sibling placed before them. The first violating node rejects the
/// entire forest.
pub fn check_forest(
    menu: &Menu,
    set: &NestedSet,
    parent_id: Option<&str>,
    forest: &[NewItem],
    max_name_length: usize,
) -> Result<(), MenuTreeError> {
    let start_depth = match parent_id {
        Some(parent_id) => set.depth(parent_id)? + 1,
        None => 0,
    };

    let mut tally = LayerTally {
        menu,
        counts: set.layer_widths(),
        max_name_length,
    };
    for node in forest {
        tally.visit(node, start_depth)?;
    }

    debug!(
        "Forest of {} items for menu {} is admissible",
        forest.iter().map(NewItem::count).sum::<usize>(),
        menu.id
    );
    Ok(())
}

/// Execution plan for deleting one layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerDeletePlan {
    pub layer: usize,

    /// `(child id, new parent)` pairs, in execution order
    pub reattachments: Vec<(String, Option<String>)>,

    /// Layer items, childless once every reattachment ran
    pub removed: Vec<String>,
}

impl LayerDeletePlan {
    /// True when the layer holds no items
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Plan the deletion of layer `layer_no`, reparenting each layer item's
/// children to that item's own parent (the root layer for layer 1).
///
/// Child counts are aggregated per destination parent over the whole layer
/// before anything is checked, so the outcome does not depend on the order in
/// which layer items are visited.
pub fn plan_layer_delete(
    menu: &Menu,
    set: &NestedSet,
    layer_no: usize,
) -> Result<LayerDeletePlan, MenuTreeError> {
    if layer_no == 0 {
        return Err(MenuTreeError::InvalidLayer { layer: layer_no });
    }

    let mut plan = LayerDeletePlan {
        layer: layer_no,
        ..Default::default()
    };
    // (destination parent, final child count) in first-seen order
    let mut destinations: Vec<(Option<String>, usize)> = Vec::new();

    for item in set.layer(layer_no) {
        let destination = set.parent(&item.id)?.map(|parent| parent.id.clone());
        let children = set.children(&item.id)?;

        let slot = match destinations.iter().position(|(parent, _)| *parent == destination) {
            Some(slot) => slot,
            None => {
                let current = match destination.as_deref() {
                    Some(parent_id) => set.children(parent_id)?.len(),
                    None => set.first_layer_children_count(),
                };
                destinations.push((destination.clone(), current));
                destinations.len() - 1
            }
        };
        // The layer item leaves, its children arrive
        destinations[slot].1 = destinations[slot].1 + children.len() - 1;

        plan.reattachments.extend(
            children
                .iter()
                .map(|child| (child.id.clone(), destination.clone())),
        );
        plan.removed.push(item.id.clone());
    }

    for (parent_id, count) in destinations {
        if menu.exceeds_children(count) {
            debug!(
                "Deleting layer {} of menu {} overflows {:?}",
                layer_no, menu.id, parent_id
            );
            return Err(MenuTreeError::LayerDeleteViolatesChildLimit {
                menu_id: menu.id.clone(),
                layer: layer_no,
                parent_id,
                count,
                max_children: menu.max_children.unwrap_or_default(),
            });
        }
    }

    Ok(plan)
}
