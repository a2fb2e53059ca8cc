use super::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default upper bound for menu names, in characters.
pub const MAX_MENU_NAME_LENGTH: usize = 30;

/// A named tree of items with optional structural limits.
///
/// Limits are nullable: `None` means unbounded. Both limits count in
/// user-facing terms:
///
/// - `max_depth`: highest permitted layer number (root layer = 1)
/// - `max_children`: highest permitted number of items in any single layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: String,

    pub name: String,

    pub max_depth: Option<u32>,

    pub max_children: Option<u32>,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

impl Menu {
    /// Create a new menu with an auto-generated UUID
    pub fn new(name: impl Into<String>, max_depth: Option<u32>, max_children: Option<u32>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            max_depth,
            max_children,
            created_at: now,
            modified_at: now,
        }
    }

    /// True if an item on `layer_no` (1-based) would break `max_depth`
    pub fn exceeds_depth(&self, layer_no: usize) -> bool {
        matches!(self.max_depth, Some(max) if layer_no > max as usize)
    }

    /// True if a layer holding `count` items would break `max_children`
    pub fn exceeds_children(&self, count: usize) -> bool {
        matches!(self.max_children, Some(max) if count > max as usize)
    }

    /// Validate the menu's content shape.
    ///
    /// Limits need no check here: `u32` already rules out negative values.
    pub fn validate(&self, max_name_length: usize) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }

        if self.name.chars().count() > max_name_length {
            return Err(ValidationError::TooLong {
                field: "name".to_string(),
                max: max_name_length,
            });
        }

        Ok(())
    }
}

/// Sparse menu update.
///
/// Limit fields are doubly optional: `None` leaves the limit untouched,
/// `Some(None)` removes it and `Some(Some(n))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub max_depth: Option<Option<u32>>,
    pub max_children: Option<Option<u32>>,
}
