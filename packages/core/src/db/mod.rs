//! Storage Layer
//!
//! This module is the engine's persistence seam:
//!
//! - [`MenuStore`] - async trait the services read snapshots from and commit
//!   change sets to
//! - [`ChangeSet`] - row-level writes produced by one mutation
//! - [`InMemoryStore`] - hash-map backed store with JSON snapshot persistence
//! - [`DomainEvent`] - notifications broadcast after successful commits
//!
//! The engine never assumes anything about physical storage beyond "a change
//! set is applied atomically".

pub mod events;
mod memory_store;
mod menu_store;

pub use events::{DomainEvent, ItemPosition};
pub use memory_store::{InMemoryStore, StoreSnapshot};
pub use menu_store::{ChangeSet, MenuStore};
