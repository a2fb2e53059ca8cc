use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default upper bound for item names, in characters.
pub const MAX_ITEM_NAME_LENGTH: usize = 30;

/// Shape validation errors for user supplied content
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' may not be longer than {max} characters")]
    TooLong { field: String, max: usize },
}

/// One element of a menu tree.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4)
/// - `menu_id`: Owning menu; every item belongs to exactly one menu
/// - `name`: Display name, non-empty and length bounded
/// - `lft` / `rgt`: Nested-set bounds. `A` is an ancestor of `B` iff
///   `A.lft < B.lft && B.rgt < A.rgt` within the same menu
///
/// Items are created unplaced (`lft == rgt == 0`) and receive their bounds
/// from [`crate::encoding::NestedSet`] when attached to a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    pub id: String,

    /// Owning menu ID
    pub menu_id: String,

    /// Display name
    pub name: String,

    /// Left nested-set bound
    pub lft: i64,

    /// Right nested-set bound
    pub rgt: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Item {
    /// Create a new unplaced item with an auto-generated UUID
    pub fn new(menu_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            menu_id: menu_id.into(),
            name: name.into(),
            lft: 0,
            rgt: 0,
            created_at: now,
            modified_at: now,
        }
    }

    /// Number of bound slots this item's subtree occupies (`rgt - lft + 1`)
    pub fn width(&self) -> i64 {
        self.rgt - self.lft + 1
    }

    /// O(1) ancestry test based on bounds
    pub fn is_ancestor_of(&self, other: &Item) -> bool {
        self.menu_id == other.menu_id && self.lft < other.lft && other.rgt < self.rgt
    }

    /// O(1) ancestry test based on bounds
    pub fn is_descendant_of(&self, other: &Item) -> bool {
        other.is_ancestor_of(self)
    }

    /// Validate an item name against the configured length bound.
    ///
    /// Whitespace-only names count as missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use menutree_core::models::{Item, MAX_ITEM_NAME_LENGTH};
    /// assert!(Item::validate_name("Drinks", MAX_ITEM_NAME_LENGTH).is_ok());
    /// assert!(Item::validate_name("   ", MAX_ITEM_NAME_LENGTH).is_err());
    /// ```
    pub fn validate_name(name: &str, max_length: usize) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        if name.chars().count() > max_length {
            return Err(ValidationError::TooLong {
                field: "name".to_string(),
                max: max_length,
            });
        }

        Ok(())
    }
}

/// Nested payload for bulk hierarchical insertion
///
/// ```json
/// { "name": "Drinks", "children": [ { "name": "Tea" }, { "name": "Coffee" } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,

    #[serde(default)]
    pub children: Vec<NewItem>,
}

impl NewItem {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<NewItem>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Total number of items described by this payload, itself included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NewItem::count).sum::<usize>()
    }
}

/// Result of a creation operation, in the same nested shape as the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedItem {
    pub item: Item,

    /// 0-based depth inside the menu (layer number is `depth + 1`)
    pub depth: usize,

    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_descendants: Vec<CreatedItem>,
}

/// Item record with its derived position, as returned by reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,

    pub depth: usize,

    pub parent_id: Option<String>,
}

/// Nested read view of an item and everything below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTree {
    #[serde(flatten)]
    pub item: Item,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemTree>,
}

impl ItemTree {
    /// Number of items in the fragment, the root included
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(ItemTree::len).sum::<usize>()
    }

    /// Always false; a fragment contains at least its root
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Target position of an item: a menu and an optional parent inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub menu_id: String,

    /// `None` places the item as a root of `menu_id`
    pub parent_id: Option<String>,
}

/// Sparse item update: only provided fields change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub placement: Option<Placement>,
}
