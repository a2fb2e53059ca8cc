//! Structural Operation Checks
//!
//! This module holds the constraint validator: pure functions that decide
//! whether a proposed change keeps a menu within its limits. Nothing here
//! touches the store; the services run these checks on loaded snapshots and
//! only commit when every check passes.

pub mod validator;

pub use validator::{
    check_forest, check_item_name, check_relocation, plan_layer_delete, LayerDeletePlan,
};
