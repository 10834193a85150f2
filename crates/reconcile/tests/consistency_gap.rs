//! List-then-act is not transactional: writes made by others after the list
//! are not observed by the same pass.

mod common;

use std::sync::Arc;

use common::{cluster, Call, FixedCatalog, MemoryStore};
use deintensify_core::{Field, ManagedResource, MutationOp, StoreErrorKind};
use deintensify_reconcile::{AbortCause, Reconciler, Stage};

fn reconciler(store: Arc<MemoryStore>) -> Reconciler {
    let catalog = Arc::new(FixedCatalog::of(&[("a", 300.0), ("b", 10.0)]));
    Reconciler::new(catalog, store, ManagedResource::gcp_clusters(), "default")
}

#[tokio::test]
async fn records_created_after_list_are_not_reconciled() {
    let store = Arc::new(MemoryStore::with_items(vec![cluster("r0", "a")]));
    store.after_list(|items| items.push(cluster("late", "a")));

    let report = reconciler(store.clone()).run().await.expect("report");

    assert!(report.is_complete());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].name(), "r0");
    assert_eq!(store.get("late").expect("late record").region(), Field::Present("a"));

    // the next pass picks it up
    let report = reconciler(store.clone()).run().await.expect("second report");
    let migrated: Vec<_> = report.migrated().map(|o| o.name()).collect();
    assert_eq!(migrated, vec!["late"]);
    assert_eq!(report.stable().count(), 1);
    assert!(store.get("late").is_none());
}

#[tokio::test]
async fn record_deleted_after_list_surfaces_as_not_found_on_delete() {
    let store = Arc::new(MemoryStore::with_items(vec![cluster("r0", "a"), cluster("r1", "a")]));
    store.after_list(|items| items.retain(|r| r.name() != Field::Present("r0")));

    let report = reconciler(store.clone()).run().await.expect("report");

    let abort = report.abort.expect("aborted");
    assert_eq!(abort.resource, "r0");
    assert_eq!(abort.stage, Stage::Deleting);
    assert!(matches!(&abort.cause, AbortCause::Mutation(e) if e.op == MutationOp::Delete && e.kind() == StoreErrorKind::NotFound));
    // the replacement for the vanished record exists
    let created = abort.created.expect("created");
    assert!(store.get(&created).is_some());
    assert_eq!(report.untouched, vec!["r1".to_string()]);
    assert_eq!(
        store.calls(),
        vec![Call::List, Call::Create("r0-".into()), Call::Delete("r0".into())]
    );
}

#[tokio::test]
async fn region_changed_after_list_is_acted_on_stale_view() {
    let store = Arc::new(MemoryStore::with_items(vec![cluster("r0", "a")]));
    // someone else moves r0 to b after the list; this pass still migrates it
    store.after_list(|items| {
        for r in items.iter_mut() {
            r.set(&["spec", "region"], "b");
        }
    });

    let report = reconciler(store.clone()).run().await.expect("report");

    assert_eq!(report.migrated().count(), 1);
    assert!(store.get("r0").is_none());
    assert_eq!(store.items().len(), 1);
}
