//! Menu Seeding Tool
//!
//! Loads a JSON fixture describing one menu and its item forest, creates it
//! through the engine's services (so every limit is enforced), and prints the
//! resulting tree.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin menu-seed -- packages/dev-tools/fixtures/lunch.json
//!
//! # Keep the seeded store as a JSON snapshot
//! MENUTREE_SNAPSHOT=target/menus.json cargo run --bin menu-seed -- fixtures/lunch.json
//! ```
//!
//! # Fixture Format
//!
//! ```json
//! {
//!   "menu": { "name": "Lunch", "maxDepth": 3, "maxChildren": 6 },
//!   "items": [ { "name": "Drinks", "children": [ { "name": "Tea" } ] } ]
//! }
//! ```
//!
//! Logging honours `RUST_LOG` and defaults to `info`. Engine limits such as
//! name lengths come from the `MENUTREE_*` environment variables.

use anyhow::{bail, Context, Result};
use menutree_core::db::InMemoryStore;
use menutree_core::models::{ItemTree, NewItem};
use menutree_core::services::{ItemService, MenuService, QueryService};
use menutree_core::EngineConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable naming where to write the seeded snapshot
const ENV_SNAPSHOT: &str = "MENUTREE_SNAPSHOT";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuFixture {
    name: String,
    #[serde(default)]
    max_depth: Option<u32>,
    #[serde(default)]
    max_children: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    menu: MenuFixture,
    #[serde(default)]
    items: Vec<NewItem>,
}

fn print_tree(tree: &ItemTree, depth: usize) {
    println!("{}- {} [{}, {}]", "  ".repeat(depth), tree.item.name, tree.item.lft, tree.item.rgt);
    for child in &tree.children {
        print_tree(child, depth + 1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: menu-seed <fixture.json>");
    };

    let raw = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    let fixture: Fixture =
        serde_json::from_slice(&raw).with_context(|| format!("invalid fixture {}", path.display()))?;

    let config = EngineConfig::from_env()?;
    tracing::info!(?config, "Seeding menu from {}", path.display());

    let store = Arc::new(InMemoryStore::new());
    let items = ItemService::with_config(store.clone(), config)?;
    let menus = MenuService::new(items.clone());
    let queries = QueryService::new(store.clone());

    let menu = menus
        .create_menu(&fixture.menu.name, fixture.menu.max_depth, fixture.menu.max_children)
        .await?;

    let created = match items.create_forest(&menu.id, None, &fixture.items).await {
        Ok(created) => created,
        Err(e) => {
            eprintln!("❌ Fixture rejected: {}", e);
            return Err(e.into());
        }
    };
    let total: usize = fixture.items.iter().map(NewItem::count).sum();
    println!("✅ Created menu '{}' with {} items ({} top-level)", menu.name, total, created.len());

    for tree in queries.menu_tree(&menu.id).await? {
        print_tree(&tree, 0);
    }
    println!(
        "depth: {}, widest layer: {}, roots: {}",
        queries.menu_depth(&menu.id).await?,
        queries.most_children_in_any_layer(&menu.id).await?,
        queries.first_layer_children_count(&menu.id).await?,
    );

    if let Ok(target) = std::env::var(ENV_SNAPSHOT) {
        store.save_snapshot(&target).await?;
        println!("💾 Snapshot written to {}", target);
    }

    Ok(())
}
