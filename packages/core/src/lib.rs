//! MenuTree Core - Tree Constraint Engine
//!
//! This crate manages menus: named trees of items arranged in layers, each
//! menu optionally limiting its depth and the number of items per layer.
//!
//! # Architecture
//!
//! - **Nested-set encoding**: Every item stores `lft`/`rgt` bounds; ancestry,
//!   subtrees and layers are derived from them, never from parent pointers
//! - **Validate, then commit**: Every mutation is checked against the target
//!   menu's limits on an in-memory snapshot before a single atomic commit
//! - **Pluggable storage**: Persistence sits behind the async [`db::MenuStore`]
//!   trait; [`db::InMemoryStore`] ships with the crate
//!
//! # Modules
//!
//! - [`models`] - Data structures (Menu, Item, request and response shapes)
//! - [`db`] - Store trait, in-memory store, domain events
//! - [`encoding`] - Nested-set encoding and read-only queries
//! - [`operations`] - Constraint validator
//! - [`services`] - ItemService, MenuService, QueryService
//! - [`config`] - Engine configuration

pub mod config;
pub mod db;
pub mod encoding;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::EngineConfig;
pub use models::*;
pub use services::*;
