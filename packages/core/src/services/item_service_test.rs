//! Tests for ItemService
//!
//! Every test runs against a fresh `InMemoryStore` and checks both the
//! returned values and what was actually committed.

#[cfg(test)]
mod tests {
    use crate::db::{ChangeSet, DomainEvent, InMemoryStore, MenuStore};
    use crate::models::{Item, ItemTree, Menu, NewItem};
    use crate::services::{ItemService, MenuService, MenuTreeError, QueryService};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Helper to create test services sharing one store
    fn create_test_services() -> (ItemService, MenuService, QueryService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let items = ItemService::new(store.clone());
        let menus = MenuService::new(items.clone());
        let queries = QueryService::new(store.clone());
        (items, menus, queries, store)
    }

    /// Compact textual shape, e.g. `R(A(A1,A2),B)`
    fn shape(trees: &[ItemTree]) -> String {
        trees
            .iter()
            .map(|tree| {
                if tree.children.is_empty() {
                    tree.item.name.clone()
                } else {
                    format!("{}({})", tree.item.name, shape(&tree.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    async fn menu_shape(queries: &QueryService, menu_id: &str) -> String {
        shape(&queries.menu_tree(menu_id).await.unwrap())
    }

    /// R { A { A1 A2 } B }; returns (menu id, ids in creation order)
    async fn seed(items: &ItemService, menus: &MenuService, limits: (Option<u32>, Option<u32>)) -> (String, Vec<String>) {
        let menu = menus.create_menu("Main", limits.0, limits.1).await.unwrap();
        let created = items
            .create_forest(
                &menu.id,
                None,
                &[NewItem::with_children(
                    "R",
                    vec![
                        NewItem::with_children("A", vec![NewItem::leaf("A1"), NewItem::leaf("A2")]),
                        NewItem::leaf("B"),
                    ],
                )],
            )
            .await
            .unwrap();

        let r = &created[0];
        let a = &r.created_descendants[0];
        let ids = vec![
            r.item.id.clone(),
            a.item.id.clone(),
            a.created_descendants[0].item.id.clone(),
            a.created_descendants[1].item.id.clone(),
            r.created_descendants[1].item.id.clone(),
        ];
        (menu.id, ids)
    }

    /// Store whose commits always fail
    struct FailingCommitStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl MenuStore for FailingCommitStore {
        async fn create_menu(&self, menu: Menu) -> anyhow::Result<Menu> {
            self.inner.create_menu(menu).await
        }
        async fn get_menu(&self, id: &str) -> anyhow::Result<Option<Menu>> {
            self.inner.get_menu(id).await
        }
        async fn list_menus(&self) -> anyhow::Result<Vec<Menu>> {
            self.inner.list_menus().await
        }
        async fn update_menu(&self, menu: Menu) -> anyhow::Result<Menu> {
            self.inner.update_menu(menu).await
        }
        async fn delete_menu(&self, id: &str) -> anyhow::Result<()> {
            self.inner.delete_menu(id).await
        }
        async fn get_item(&self, id: &str) -> anyhow::Result<Option<Item>> {
            self.inner.get_item(id).await
        }
        async fn items_by_menu(&self, menu_id: &str) -> anyhow::Result<Vec<Item>> {
            self.inner.items_by_menu(menu_id).await
        }
        async fn commit(&self, _changes: ChangeSet) -> anyhow::Result<()> {
            bail!("disk full")
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn test_create_root_and_child() {
            let (items, menus, queries, _store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();

            let root = items.create_root(&menu.id, "Drinks").await.unwrap();
            let child = items.create_child(&root.item.id, "Tea").await.unwrap();

            assert_eq!(root.depth, 0);
            assert_eq!(root.parent_id, None);
            assert_eq!((root.item.lft, root.item.rgt), (1, 2));
            assert_eq!(child.depth, 1);
            assert_eq!(child.parent_id.as_deref(), Some(root.item.id.as_str()));

            let stored_root = queries.get_item(&root.item.id).await.unwrap();
            assert_eq!((stored_root.item.lft, stored_root.item.rgt), (1, 4));
            assert_eq!(menu_shape(&queries, &menu.id).await, "Drinks(Tea)");
        }

        #[tokio::test]
        async fn test_create_child_of_unknown_parent_is_not_found() {
            let (items, _menus, _queries, _store) = create_test_services();
            let err = items.create_child("ghost", "Tea").await.unwrap_err();
            assert!(matches!(err, MenuTreeError::ItemNotFound { .. }));
        }

        #[tokio::test]
        async fn test_create_in_unknown_menu_is_not_found() {
            let (items, _menus, _queries, _store) = create_test_services();
            let err = items.create_root("ghost", "Tea").await.unwrap_err();
            assert!(matches!(err, MenuTreeError::MenuNotFound { .. }));
        }

        #[tokio::test]
        async fn test_parent_from_another_menu_is_rejected() {
            let (items, menus, _queries, store) = create_test_services();
            let first = menus.create_menu("First", None, None).await.unwrap();
            let second = menus.create_menu("Second", None, None).await.unwrap();
            let foreign = items.create_root(&first.id, "Foreign").await.unwrap();

            let err = items
                .create_item(&second.id, Some(foreign.item.id.as_str()), "Tea")
                .await
                .unwrap_err();

            assert!(matches!(err, MenuTreeError::ParentMenuMismatch { .. }));
            assert!(store.items_by_menu(&second.id).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_invalid_names_are_rejected() {
            let (items, menus, _queries, store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();

            let err = items.create_root(&menu.id, "   ").await.unwrap_err();
            assert!(matches!(err, MenuTreeError::InvalidContent { .. }));

            let err = items.create_root(&menu.id, &"x".repeat(31)).await.unwrap_err();
            assert!(err.is_validation());
            assert!(store.items_by_menu(&menu.id).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_third_root_exceeds_children_limit() {
            let (items, menus, queries, _store) = create_test_services();
            let menu = menus.create_menu("Main", None, Some(2)).await.unwrap();

            items.create_root(&menu.id, "One").await.unwrap();
            items.create_root(&menu.id, "Two").await.unwrap();
            let err = items.create_root(&menu.id, "Three").await.unwrap_err();

            assert!(matches!(
                err,
                MenuTreeError::ChildrenExceeded { layer: 1, count: 3, max_children: 2, .. }
            ));
            assert_eq!(queries.first_layer_children_count(&menu.id).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_grandchild_exceeds_depth_limit() {
            let (items, menus, queries, store) = create_test_services();
            let menu = menus.create_menu("Main", Some(2), None).await.unwrap();

            let root = items.create_root(&menu.id, "Root").await.unwrap();
            let child = items.create_child(&root.item.id, "Child").await.unwrap();
            let err = items.create_child(&child.item.id, "Grandchild").await.unwrap_err();

            assert!(matches!(
                err,
                MenuTreeError::DepthExceeded { layer: 3, max_depth: 2, .. }
            ));
            assert_eq!(store.items_by_menu(&menu.id).await.unwrap().len(), 2);
            assert_eq!(queries.menu_depth(&menu.id).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_create_forest_reports_final_bounds() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2),B)");

            // R was appended first but must report its final right bound
            let root = queries.get_item(&ids[0]).await.unwrap();
            assert_eq!((root.item.lft, root.item.rgt), (1, 10));
            let a2 = queries.get_item(&ids[3]).await.unwrap();
            assert_eq!(a2.depth, 2);
            assert_eq!(a2.parent_id.as_deref(), Some(ids[1].as_str()));
        }

        #[tokio::test]
        async fn test_create_forest_response_matches_store() {
            let (items, menus, queries, _store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();

            let created = items
                .create_forest(
                    &menu.id,
                    None,
                    &[NewItem::with_children("Soups", vec![NewItem::leaf("Miso")])],
                )
                .await
                .unwrap();

            let stored = queries.get_item(&created[0].item.id).await.unwrap();
            assert_eq!(created[0].item, stored.item);
            assert_eq!(created[0].created_descendants[0].depth, 1);
        }

        #[tokio::test]
        async fn test_create_forest_is_all_or_nothing() {
            let (items, menus, _queries, store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();

            let err = items
                .create_forest(
                    &menu.id,
                    None,
                    &[
                        NewItem::leaf("Fine"),
                        NewItem::with_children("Also fine", vec![NewItem::leaf("")]),
                    ],
                )
                .await
                .unwrap_err();

            match err {
                MenuTreeError::InvalidContent { name, .. } => assert_eq!(name, ""),
                other => panic!("unexpected error: {other}"),
            }
            assert!(store.items_by_menu(&menu.id).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_create_forest_under_existing_parent_counts_persisted_layer() {
            let (items, menus, _queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, Some(3))).await;

            // Layer 3 holds A1 A2; two more under B would make four
            let err = items
                .create_forest(&menu_id, Some(ids[4].as_str()), &[NewItem::leaf("B1"), NewItem::leaf("B2")])
                .await
                .unwrap_err();
            assert!(matches!(err, MenuTreeError::ChildrenExceeded { layer: 3, count: 4, .. }));

            items
                .create_forest(&menu_id, Some(ids[4].as_str()), &[NewItem::leaf("B1")])
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_commit_failure_is_partial_create_failure() {
            let store = Arc::new(FailingCommitStore {
                inner: InMemoryStore::new(),
            });
            let items = ItemService::new(store.clone());
            let menu = store.create_menu(Menu::new("Main", None, None)).await.unwrap();

            let err = items
                .create_forest(
                    &menu.id,
                    None,
                    &[NewItem::with_children("A", vec![NewItem::leaf("B")])],
                )
                .await
                .unwrap_err();

            match err {
                MenuTreeError::PartialCreateFailure { attempted, .. } => assert_eq!(attempted, 2),
                other => panic!("unexpected error: {other}"),
            }

            // Single creation surfaces the raw storage failure
            let err = items.create_root(&menu.id, "A").await.unwrap_err();
            assert!(matches!(err, MenuTreeError::StorageFailed(_)));
        }
    }

    mod update {
        use super::*;

        #[tokio::test]
        async fn test_move_within_menu_carries_subtree() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            items.move_item(&ids[1], &menu_id, Some(ids[4].as_str())).await.unwrap();

            assert_eq!(menu_shape(&queries, &menu_id).await, "R(B(A(A1,A2)))");
            assert_eq!(queries.depth(&ids[2]).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_move_to_root_layer() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            items.move_item(&ids[1], &menu_id, None).await.unwrap();
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(B),A(A1,A2)");
        }

        #[tokio::test]
        async fn test_move_rejects_self_and_descendant_parents() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let err = items.move_item(&ids[1], &menu_id, Some(ids[1].as_str())).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::SelfParenting { .. }));

            let err = items.move_item(&ids[0], &menu_id, Some(ids[3].as_str())).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::CyclicMove { .. }));

            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2),B)");
        }

        #[tokio::test]
        async fn test_move_is_reversible() {
            let (items, menus, queries, store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;
            let bounds = |rows: Vec<Item>| {
                let mut rows: Vec<(String, i64, i64)> =
                    rows.into_iter().map(|item| (item.id, item.lft, item.rgt)).collect();
                rows.sort();
                rows
            };
            let before = bounds(store.items_by_menu(&menu_id).await.unwrap());

            // B was R's last child, so appending it back restores the original order
            items.move_item(&ids[4], &menu_id, Some(ids[2].as_str())).await.unwrap();
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1(B),A2))");
            items.move_item(&ids[4], &menu_id, Some(ids[0].as_str())).await.unwrap();

            assert_eq!(bounds(store.items_by_menu(&menu_id).await.unwrap()), before);
        }

        #[tokio::test]
        async fn test_move_checks_subtree_depth() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (Some(3), None)).await;

            // A (with children) under B would reach layer 4
            let err = items.move_item(&ids[1], &menu_id, Some(ids[4].as_str())).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::DepthExceeded { layer: 4, .. }));
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2),B)");
        }

        #[tokio::test]
        async fn test_move_across_menus_retags_subtree() {
            let (items, menus, queries, store) = create_test_services();
            let (source_id, ids) = seed(&items, &menus, (None, None)).await;
            let target = menus.create_menu("Target", None, None).await.unwrap();
            let anchor = items.create_root(&target.id, "T").await.unwrap();

            let moved = items
                .move_item(&ids[1], &target.id, Some(anchor.item.id.as_str()))
                .await
                .unwrap();

            assert_eq!(moved.menu_id, target.id);
            assert_eq!(menu_shape(&queries, &source_id).await, "R(B)");
            assert_eq!(menu_shape(&queries, &target.id).await, "T(A(A1,A2))");

            let a1 = store.get_item(&ids[2]).await.unwrap().unwrap();
            assert_eq!(a1.menu_id, target.id);

            // Both menus are left with dense bounds
            let source_root = queries.get_item(&ids[0]).await.unwrap();
            assert_eq!((source_root.item.lft, source_root.item.rgt), (1, 4));
            let target_root = queries.get_item(&anchor.item.id).await.unwrap();
            assert_eq!((target_root.item.lft, target_root.item.rgt), (1, 8));
        }

        #[tokio::test]
        async fn test_move_across_menus_uses_target_limits() {
            let (items, menus, queries, _store) = create_test_services();
            let (source_id, ids) = seed(&items, &menus, (None, None)).await;
            let target = menus.create_menu("Target", None, Some(1)).await.unwrap();
            let anchor = items.create_root(&target.id, "T").await.unwrap();

            // A1 and A2 would share layer 3 of a menu allowing one item per layer
            let err = items
                .move_item(&ids[1], &target.id, Some(anchor.item.id.as_str()))
                .await
                .unwrap_err();
            assert!(matches!(err, MenuTreeError::ChildrenExceeded { layer: 3, count: 2, .. }));

            assert_eq!(menu_shape(&queries, &source_id).await, "R(A(A1,A2),B)");
            assert_eq!(menu_shape(&queries, &target.id).await, "T");
        }

        #[tokio::test]
        async fn test_same_placement_is_a_no_op() {
            let (items, menus, _queries, store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;
            let mut menu = store.get_menu(&menu_id).await.unwrap().unwrap();
            menu.max_children = Some(1);
            store.update_menu(menu).await.unwrap();

            let before = store.items_by_menu(&menu_id).await.unwrap();
            let mut events = items.subscribe_to_events();

            // Layer 2 already breaks max_children=1; an unchanged placement is not revalidated
            items.move_item(&ids[4], &menu_id, Some(ids[0].as_str())).await.unwrap();

            let mut after = store.items_by_menu(&menu_id).await.unwrap();
            let mut before = before;
            before.sort_by(|a, b| a.id.cmp(&b.id));
            after.sort_by(|a, b| a.id.cmp(&b.id));
            assert_eq!(before, after);
            assert!(events.try_recv().is_err());
        }

        #[tokio::test]
        async fn test_rename_item() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let renamed = items.rename_item(&ids[4], "Bar").await.unwrap();
            assert_eq!(renamed.name, "Bar");
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2),Bar)");

            let err = items.rename_item(&ids[4], "").await.unwrap_err();
            assert!(matches!(err, MenuTreeError::InvalidContent { .. }));
        }

        #[tokio::test]
        async fn test_update_renames_and_moves_in_one_commit() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let update = crate::models::ItemUpdate {
                name: Some("Bottom".to_string()),
                placement: Some(crate::models::Placement {
                    menu_id: menu_id.clone(),
                    parent_id: Some(ids[3].clone()),
                }),
            };
            items.update_item(&ids[4], update).await.unwrap();

            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2(Bottom)))");
        }
    }

    mod delete {
        use super::*;

        #[tokio::test]
        async fn test_delete_item_requires_no_children() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let err = items.delete_item(&ids[1]).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::HasChildren { children: 2, .. }));

            items.delete_item(&ids[2]).await.unwrap();
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A2),B)");
        }

        #[tokio::test]
        async fn test_delete_subtree_removes_descendants_first() {
            let (items, menus, queries, store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let removed = items.delete_subtree(&ids[1]).await.unwrap();

            assert_eq!(removed, vec![ids[3].clone(), ids[2].clone(), ids[1].clone()]);
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(B)");
            assert!(store.get_item(&ids[2]).await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_delete_by_menu_empties_menu() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, _ids) = seed(&items, &menus, (None, None)).await;
            items.create_root(&menu_id, "Second").await.unwrap();

            let removed = items.delete_by_menu(&menu_id).await.unwrap();
            assert_eq!(removed.len(), 6);
            assert!(queries.menu_tree(&menu_id).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_delete_descendants_keeps_item() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let removed = items.delete_descendants(&ids[0]).await.unwrap();
            assert_eq!(removed.len(), 4);
            assert_eq!(menu_shape(&queries, &menu_id).await, "R");
        }

        #[tokio::test]
        async fn test_delete_layer_reparents_children() {
            let (items, menus, queries, store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;

            let plan = items.delete_layer(&menu_id, 2).await.unwrap();

            assert_eq!(plan.removed, vec![ids[1].clone(), ids[4].clone()]);
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A1,A2)");
            assert!(store.get_item(&ids[1]).await.unwrap().is_none());

            let root = queries.get_item(&ids[0]).await.unwrap();
            assert_eq!((root.item.lft, root.item.rgt), (1, 6));
        }

        #[tokio::test]
        async fn test_delete_layer_overflow_leaves_menu_unchanged() {
            let (items, menus, queries, store) = create_test_services();
            let (menu_id, _ids) = seed(&items, &menus, (None, None)).await;

            // Lower the limit behind the engine's back, as an old menu might have it
            let mut menu = store.get_menu(&menu_id).await.unwrap().unwrap();
            menu.max_children = Some(1);
            store.update_menu(menu).await.unwrap();

            let err = items.delete_layer(&menu_id, 2).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::LayerDeleteViolatesChildLimit { .. }));
            assert_eq!(menu_shape(&queries, &menu_id).await, "R(A(A1,A2),B)");
        }

        #[tokio::test]
        async fn test_delete_root_layer() {
            let (items, menus, queries, _store) = create_test_services();
            let (menu_id, _ids) = seed(&items, &menus, (None, None)).await;

            items.delete_layer(&menu_id, 1).await.unwrap();
            assert_eq!(menu_shape(&queries, &menu_id).await, "A(A1,A2),B");
        }

        #[tokio::test]
        async fn test_delete_layer_zero_is_invalid() {
            let (items, menus, _queries, _store) = create_test_services();
            let (menu_id, _ids) = seed(&items, &menus, (None, None)).await;

            let err = items.delete_layer(&menu_id, 0).await.unwrap_err();
            assert!(matches!(err, MenuTreeError::InvalidLayer { layer: 0 }));
        }
    }

    mod repair {
        use super::*;

        #[tokio::test]
        async fn test_rebuild_compacts_stale_bounds() {
            let (items, menus, queries, store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();

            let mut root = Item::new(&menu.id, "Root");
            (root.lft, root.rgt) = (10, 40);
            let mut child = Item::new(&menu.id, "Child");
            (child.lft, child.rgt) = (20, 25);
            store
                .commit(ChangeSet {
                    upserts: vec![root.clone(), child.clone()],
                    deletes: Vec::new(),
                })
                .await
                .unwrap();

            assert_eq!(items.rebuild(&menu.id).await.unwrap(), 2);
            assert_eq!(items.rebuild(&menu.id).await.unwrap(), 0);

            let stored = queries.get_item(&child.id).await.unwrap();
            assert_eq!((stored.item.lft, stored.item.rgt), (2, 3));
            assert_eq!(menu_shape(&queries, &menu.id).await, "Root(Child)");
        }
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn test_events_follow_commits_only() {
            let (items, menus, _queries, _store) = create_test_services();
            let menu = menus.create_menu("Main", None, Some(1)).await.unwrap();
            let mut events = items.subscribe_to_events();

            let root = items.create_root(&menu.id, "Only").await.unwrap();
            match events.try_recv().unwrap() {
                DomainEvent::ItemCreated { item } => assert_eq!(item.id, root.item.id),
                other => panic!("unexpected event: {other:?}"),
            }

            assert!(items.create_root(&menu.id, "Too many").await.is_err());
            assert!(events.try_recv().is_err());
        }

        #[tokio::test]
        async fn test_forest_emits_one_event_per_item() {
            let (items, menus, _queries, _store) = create_test_services();
            let menu = menus.create_menu("Main", None, None).await.unwrap();
            let mut events = items.subscribe_to_events();

            items
                .create_forest(
                    &menu.id,
                    None,
                    &[NewItem::with_children("A", vec![NewItem::leaf("B"), NewItem::leaf("C")])],
                )
                .await
                .unwrap();

            let mut created = 0;
            while let Ok(event) = events.try_recv() {
                assert_eq!(event.event_type(), "item:created");
                created += 1;
            }
            assert_eq!(created, 3);
        }

        #[tokio::test]
        async fn test_move_event_carries_positions() {
            let (items, menus, _queries, _store) = create_test_services();
            let (menu_id, ids) = seed(&items, &menus, (None, None)).await;
            let mut events = items.subscribe_to_events();

            items.move_item(&ids[4], &menu_id, Some(ids[1].as_str())).await.unwrap();

            match events.try_recv().unwrap() {
                DomainEvent::ItemMoved { item_id, from, to } => {
                    assert_eq!(item_id, ids[4]);
                    assert_eq!(from.parent_id.as_deref(), Some(ids[0].as_str()));
                    assert_eq!(to.parent_id.as_deref(), Some(ids[1].as_str()));
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
