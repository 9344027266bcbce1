#![cfg(test)]
use std::sync::{Arc, Mutex};

use tgsync_common::Error;
use tgsync_common::inventory::AssetId;
use tgsync_common::network::Cidr;
use tgsync_core::PurgeOutcome;
use tgsync_core::executor::{ProgressFn, PurgeScope};
use tgsync_core::memory::MemoryStore;

use crate::fixtures::{asset, dry_run, pipeline, pipeline_with};

fn cidr(s: &str) -> Cidr {
    s.parse().unwrap()
}

fn ids(raw: &[&str]) -> Vec<AssetId> {
    raw.iter().map(|id| AssetId::new(*id)).collect()
}

/*************************************************************
                        Direct purge
**************************************************************/

#[tokio::test]
async fn partial_failures_are_reported_per_item() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a1", &["10.0.0.1"]))
            .with_asset(asset("a2", &["10.0.0.2"]))
            .with_asset(asset("a3", &["10.0.0.3"]))
            .with_asset(asset("a4", &["10.0.0.4"]))
            .with_asset(asset("a5", &["10.0.0.5"]))
            .with_asset(asset("keep", &["10.0.1.1"])),
    );
    store.fail_delete("a2");
    store.fail_delete("a4");

    let outcome = pipeline(&store)
        .purge_cidr(cidr("10.0.0.0/24"), false, None)
        .await?;

    let PurgeOutcome::Purged { report, .. } = outcome else {
        panic!("expected a purge");
    };
    assert_eq!(report.matched, 5);
    assert_eq!(report.succeeded, 3);
    let mut failed = report.failed.clone();
    failed.sort();
    assert_eq!(failed, ids(&["a2", "a4"]));
    assert_eq!(store.asset_ids(), ids(&["a2", "a4", "keep"]));
    Ok(())
}

#[tokio::test]
async fn empty_match_deletes_nothing() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new().with_asset(asset("far", &["172.20.0.1"])));

    let outcome = pipeline(&store)
        .purge_cidr(cidr("10.0.0.0/8"), false, None)
        .await?;

    let PurgeOutcome::Purged { report, .. } = outcome else {
        panic!("expected a purge");
    };
    assert_eq!(report.matched, 0);
    assert_eq!(report.succeeded, 0);
    assert!(report.failed.is_empty());
    assert_eq!(store.count_calls("delete_inventory_item"), 0);
    Ok(())
}

#[tokio::test]
async fn every_address_is_checked_and_items_deleted_once() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("multi", &["192.168.50.1", "10.7.0.1", "10.7.0.2"]))
            .with_asset(asset("outside", &["10.8.0.1"])),
    );

    let outcome = pipeline(&store)
        .purge_cidr(cidr("10.7.0.0/16"), false, None)
        .await?;

    assert!(matches!(
        outcome,
        PurgeOutcome::Purged { ref report, .. } if report.succeeded == 1
    ));
    assert_eq!(store.count_calls("delete_inventory_item"), 1);
    assert!(store.calls().contains(&"query_assets all within 30d".to_string()));
    assert_eq!(store.asset_ids(), ids(&["outside"]));
    Ok(())
}

#[tokio::test]
async fn over_capacity_purge_is_fatal() {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a", &["10.0.0.1"]))
            .with_reported_total(12_000),
    );

    let result = pipeline(&store)
        .purge_cidr(cidr("10.0.0.0/8"), false, None)
        .await;

    assert!(matches!(result, Err(Error::OverCapacity { .. })));
    assert_eq!(store.count_calls("delete_inventory_item"), 0);
}

#[tokio::test]
async fn plan_then_execute_reports_progress() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("p1", &["10.3.0.1"]))
            .with_asset(asset("p2", &["10.3.0.2"]))
            .with_asset(asset("p3", &["10.3.0.3"])),
    );
    let pipeline = pipeline(&store);

    let plan = pipeline.plan_purge(cidr("10.3.0.0/24"), false).await?;
    assert_eq!(plan.matches, ids(&["p1", "p2", "p3"]));
    assert_eq!(store.count_calls("delete_inventory_item"), 0);

    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ticks);
    let on_progress: ProgressFn = Arc::new(move |done| sink.lock().unwrap().push(done));
    let outcome = pipeline.execute_purge(plan, Some(on_progress)).await;

    let PurgeOutcome::Purged { report, .. } = outcome else {
        panic!("expected a purge");
    };
    assert_eq!(report.succeeded, 3);
    let mut ticks = ticks.lock().unwrap().clone();
    ticks.sort_unstable();
    assert_eq!(ticks, vec![1, 2, 3]);
    assert!(store.asset_ids().is_empty());
    Ok(())
}

/*************************************************************
                      Purge through a group
**************************************************************/

#[tokio::test]
async fn via_group_reconciles_the_staging_group() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("in", &["10.9.4.4"]))
            .with_asset(asset("out", &["10.10.0.1"])),
    );
    let pipeline = pipeline(&store);

    let outcome = pipeline
        .purge_cidr(cidr("10.9.0.0/16"), true, None)
        .await?;

    let PurgeOutcome::Purged { scope, report } = outcome else {
        panic!("expected a purge");
    };
    let PurgeScope::Group(group) = scope else {
        panic!("expected a group scope");
    };
    assert_eq!(group.name, "To Be Deleted - 10.9.0.0/16");
    assert_eq!(group.members.joined(), "10.9.0.0/16");
    assert_eq!(report.succeeded, 1);
    assert!(
        store
            .calls()
            .contains(&format!("query_assets group {} within 30d", group.id))
    );

    pipeline
        .purge_cidr(cidr("10.9.0.0/16"), true, None)
        .await?;
    assert_eq!(store.groups().len(), 1);
    assert_eq!(store.count_calls("update_named_group"), 1);
    Ok(())
}

/*************************************************************
                          Dry runs
**************************************************************/

#[tokio::test]
async fn dry_run_lists_matches_only() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("x", &["10.1.0.1"]))
            .with_asset(asset("y", &["10.1.0.2"])),
    );

    let outcome = pipeline_with(&store, dry_run())
        .purge_cidr(cidr("10.1.0.0/24"), true, None)
        .await?;

    match outcome {
        PurgeOutcome::Planned { scope, matches } => {
            assert_eq!(scope, PurgeScope::Cidr(cidr("10.1.0.0/24")));
            assert_eq!(matches, ids(&["x", "y"]));
        }
        other => panic!("expected a plan, got {other:?}"),
    }
    assert!(store.groups().is_empty());
    assert_eq!(store.count_calls("delete_inventory_item"), 0);
    Ok(())
}
