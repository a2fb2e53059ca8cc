/// Configuration for the menu tree services
use crate::models::{MAX_ITEM_NAME_LENGTH, MAX_MENU_NAME_LENGTH};
use crate::services::MenuTreeError;
use serde::{Deserialize, Serialize};

pub const ENV_MAX_ITEM_NAME_LENGTH: &str = "MENUTREE_MAX_ITEM_NAME_LENGTH";
pub const ENV_MAX_MENU_NAME_LENGTH: &str = "MENUTREE_MAX_MENU_NAME_LENGTH";
pub const ENV_EVENT_CHANNEL_CAPACITY: &str = "MENUTREE_EVENT_CHANNEL_CAPACITY";

/// Engine-wide settings shared by the services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound for item names, in characters
    pub max_item_name_length: usize,

    /// Upper bound for menu names, in characters
    pub max_menu_name_length: usize,

    /// Broadcast channel capacity for domain events.
    ///
    /// Lagging subscribers lose the oldest events once the channel is full.
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_item_name_length: MAX_ITEM_NAME_LENGTH,
            max_menu_name_length: MAX_MENU_NAME_LENGTH,
            event_channel_capacity: 128,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `MENUTREE_*` environment variables
    pub fn from_env() -> Result<Self, MenuTreeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values returned by `lookup`, then validated
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MenuTreeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let fields = [
            (ENV_MAX_ITEM_NAME_LENGTH, &mut config.max_item_name_length),
            (ENV_MAX_MENU_NAME_LENGTH, &mut config.max_menu_name_length),
            (ENV_EVENT_CHANNEL_CAPACITY, &mut config.event_channel_capacity),
        ];
        for (key, field) in fields {
            if let Some(raw) = lookup(key) {
                *field = raw.trim().parse().map_err(|_| {
                    MenuTreeError::invalid_config(format!("{key} must be a positive integer, got '{raw}'"))
                })?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), MenuTreeError> {
        if self.max_item_name_length == 0 {
            return Err(MenuTreeError::invalid_config(
                "max_item_name_length must be greater than 0",
            ));
        }

        if self.max_menu_name_length == 0 {
            return Err(MenuTreeError::invalid_config(
                "max_menu_name_length must be greater than 0",
            ));
        }

        // tokio's broadcast channel panics on a zero capacity
        if self.event_channel_capacity == 0 {
            return Err(MenuTreeError::invalid_config(
                "event_channel_capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}
