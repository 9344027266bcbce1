#![cfg(test)]
use std::sync::Arc;

use tgsync_common::Error;
use tgsync_common::config::{PipelineConfig, ScanSettings};
use tgsync_common::criterion::{GroupCriterion, Severity};
use tgsync_common::inventory::{AgentGroup, AgentGroupId, InventoryItem, MemberList};
use tgsync_common::scan::{Folder, ScanTemplate, ScannerRef};
use tgsync_core::memory::MemoryStore;
use tgsync_core::pipeline::dependent_scan_name;
use tgsync_core::reconciler::Reconciliation;
use tgsync_core::scan::ScanTrigger;
use tgsync_core::{CriterionKind, SyncOutcome};

use tracing::Level;

use crate::fixtures::{addr, agent, asset, capture_levels, dry_run, pipeline, pipeline_with, tag};

/*************************************************************
                     Convergence of groups
**************************************************************/

#[tokio::test]
async fn agent_group_sync_converges_across_runs() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new().with_agent_group(
        AgentGroup {
            id: AgentGroupId::new("31"),
            name: "Linux".into(),
        },
        vec![
            agent("1", "10.0.0.5", "web01"),
            agent("2", "8.8.8.8", "edge"),
            agent("3", "0.0.0.0", "ghost"),
            agent("4", "192.168.1.7", "db01"),
        ],
    ));
    let pipeline = pipeline(&store);

    for _ in 0..2 {
        let criteria = pipeline.discover_criteria(CriterionKind::AgentGroups).await?;
        for report in pipeline.sync_all(criteria).await {
            report.outcome?;
        }
    }

    let groups = store.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Agent Group - Linux");
    assert_eq!(groups[0].members.joined(), "10.0.0.5,192.168.1.7");
    assert_eq!(store.count_calls("create_named_group"), 1);
    assert_eq!(store.count_calls("update_named_group"), 1);
    Ok(())
}

#[tokio::test]
async fn update_replaces_members_wholesale() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a", &["10.1.1.1"]).with_tag(tag("Site", "NYC")))
            .with_group(
                "zTag: Site - NYC (static)",
                MemberList::parse("10.9.9.9,10.8.8.8"),
            ),
    );
    let criterion = GroupCriterion::TagValue {
        category: "Site".into(),
        value: "NYC".into(),
        kind: "static".into(),
    };

    let outcome = pipeline(&store).sync(&criterion).await?;

    match outcome {
        SyncOutcome::Synced {
            reconciliation: Reconciliation::Updated { group, previous },
            ..
        } => {
            assert_eq!(group.members.joined(), "10.1.1.1");
            assert_eq!(previous.len(), 2);
        }
        other => panic!("expected an update, got {other:?}"),
    }
    Ok(())
}

/*************************************************************
                    Address list building
**************************************************************/

#[tokio::test]
async fn severity_group_keeps_duplicate_addresses() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a", &["192.168.1.5"]))
            .with_asset(asset("b", &["0.0.0.0"]))
            .with_asset(asset("c", &["192.168.1.5", "192.168.1.6"])),
    );
    for id in ["a", "b", "c"] {
        store.add_finding(id, Severity::Critical);
    }
    let pipeline = pipeline(&store);

    let criteria = pipeline
        .discover_criteria(CriterionKind::Severity(vec![Severity::Critical]))
        .await?;
    let reports = pipeline.sync_all(criteria).await;

    assert_eq!(reports.len(), 1);
    let group = store
        .group("zHosts with Critical Vuln Results")
        .expect("severity group written");
    assert_eq!(group.members.joined(), "192.168.1.5,192.168.1.5");
    assert!(
        store
            .calls()
            .contains(&"query_assets severity Critical within 30d".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn empty_list_skips_and_leaves_group_untouched() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(InventoryItem::new("no-ip").with_tag(tag("Env", "Lab")))
            .with_asset(asset("zero", &["0.0.0.0"]).with_tag(tag("Env", "Lab")))
            .with_group("zTag: Env - Lab (static)", MemberList::parse("10.0.0.1")),
    );
    let criterion = GroupCriterion::TagValue {
        category: "Env".into(),
        value: "Lab".into(),
        kind: "static".into(),
    };

    let outcome = pipeline(&store).sync(&criterion).await?;

    assert_eq!(
        outcome,
        SyncOutcome::Skipped {
            name: "zTag: Env - Lab (static)".into()
        }
    );
    assert_eq!(store.count_calls("update_named_group"), 0);
    assert_eq!(store.count_calls("create_named_group"), 0);
    assert_eq!(
        store.group("zTag: Env - Lab (static)").unwrap().members.joined(),
        "10.0.0.1"
    );
    Ok(())
}

#[tokio::test]
async fn agent_only_filters_to_requested_ranges() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(
                asset("a", &["10.20.0.4", "192.168.7.7"])
                    .with_fqdn("files.corp")
                    .with_source("NESSUS_AGENT"),
            )
            .with_asset(
                asset("b", &["10.20.0.5"])
                    .with_source("NESSUS_AGENT")
                    .with_source("NESSUS_SCAN"),
            )
            .with_asset(asset("c", &["127.0.0.1", "8.8.4.4"]).with_source("NESSUS_AGENT")),
    );
    let cfg = PipelineConfig {
        snapshot_label: "2024-05-01 10:30".into(),
        ..PipelineConfig::default()
    };
    let pipeline = pipeline_with(&store, cfg);

    let criteria = pipeline
        .discover_criteria(CriterionKind::AgentOnly(vec!["10.20.0.0/16".parse()?]))
        .await?;
    let outcome = pipeline.sync(&criteria[0]).await?;

    let SyncOutcome::Synced { list, .. } = outcome else {
        panic!("expected the agent-only group to be written");
    };
    assert_eq!(list.joined(), "10.20.0.4");
    assert_eq!(list.entries()[0].label.as_deref(), Some("files.corp"));
    assert!(
        store
            .group("Scanned Only by Agents (as of 2024-05-01 10:30)")
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn agent_only_defaults_to_rfc1918() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new().with_asset(
            asset("a", &["127.0.0.1", "172.16.3.3", "8.8.8.8", "192.168.0.9"])
                .with_source("NESSUS_AGENT"),
        ),
    );

    let outcome = pipeline(&store)
        .sync(&GroupCriterion::AgentOnly {
            cidr_filters: Vec::new(),
        })
        .await?;

    let SyncOutcome::Synced { list, .. } = outcome else {
        panic!("expected the agent-only group to be written");
    };
    assert_eq!(list.joined(), "172.16.3.3,192.168.0.9");
    Ok(())
}

/*************************************************************
                     Failures and dry runs
**************************************************************/

#[tokio::test]
async fn over_capacity_writes_nothing() {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a", &["10.0.0.1"]))
            .with_reported_total(5001),
    );
    store.add_finding("a", Severity::Critical);

    let result = pipeline(&store)
        .sync(&GroupCriterion::SeverityBucket {
            level: Severity::Critical,
        })
        .await;

    assert!(matches!(result, Err(Error::OverCapacity { reported: 5001, ceiling: 5000, .. })));
    assert_eq!(store.count_calls("query_named_groups"), 0);
    assert!(store.groups().is_empty());
}

#[tokio::test]
async fn one_failing_criterion_does_not_stop_the_rest() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_tag_value(tag("Env", "Prod"))
            .with_tag_value(tag("Env", "Dev"))
            .with_asset(asset("p", &["10.0.0.1"]).with_tag(tag("Env", "Prod")))
            .with_asset(asset("d", &["10.0.0.2"]).with_tag(tag("Env", "Dev")))
            .with_group("zTag: Env - Dev (static)", MemberList::default()),
    );
    store.fail_operation("create_named_group");
    let pipeline = pipeline(&store);
    let (_guard, levels) = capture_levels();

    let criteria = pipeline.discover_criteria(CriterionKind::Tags).await?;
    let reports = pipeline.sync_all(criteria).await;

    let errors = levels.lock().unwrap().iter().filter(|l| **l == Level::ERROR).count();
    assert_eq!(errors, 1);
    assert_eq!(reports.len(), 2);
    assert!(matches!(reports[0].outcome, Err(Error::External { .. })));
    assert!(matches!(
        reports[1].outcome,
        Ok(SyncOutcome::Synced {
            reconciliation: Reconciliation::Updated { .. },
            ..
        })
    ));
    assert_eq!(
        store.group("zTag: Env - Dev (static)").unwrap().members.joined(),
        "10.0.0.2"
    );
    Ok(())
}

#[tokio::test]
async fn dry_run_plans_without_writing() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new().with_agent_group(
        AgentGroup {
            id: AgentGroupId::new("8"),
            name: "Windows".into(),
        },
        vec![agent("1", "10.3.3.3", "win01")],
    ));
    let pipeline = pipeline_with(&store, dry_run());

    let criteria = pipeline.discover_criteria(CriterionKind::AgentGroups).await?;
    let reports = pipeline.sync_all(criteria).await;

    match &reports[0].outcome {
        Ok(SyncOutcome::Planned { name, list }) => {
            assert_eq!(name, "Agent Group - Windows");
            assert_eq!(list.joined(), "10.3.3.3");
        }
        other => panic!("expected a plan, got {other:?}"),
    }
    assert!(store.groups().is_empty());
    Ok(())
}

/*************************************************************
                        Dependent scan
**************************************************************/

#[tokio::test]
async fn scan_launches_against_reconciled_group() -> anyhow::Result<()> {
    let store = Arc::new(
        MemoryStore::new()
            .with_asset(asset("a", &["10.5.5.5"]).with_source("NESSUS_AGENT"))
            .with_scanner(ScannerRef {
                id: "2".into(),
                uuid: "00000000-scanner".into(),
                name: "Internal Scanner".into(),
            })
            .with_folder(Folder {
                id: "3".into(),
                name: "My Scans".into(),
            })
            .with_template(ScanTemplate {
                uuid: "731a8e52-basic".into(),
                name: "basic".into(),
            }),
    );
    let cfg = PipelineConfig {
        snapshot_label: "nightly".into(),
        ..PipelineConfig::default()
    };
    let pipeline = pipeline_with(&store, cfg);

    let outcome = pipeline
        .sync(&GroupCriterion::AgentOnly {
            cidr_filters: Vec::new(),
        })
        .await?;
    let SyncOutcome::Synced { reconciliation, .. } = outcome else {
        panic!("expected the agent-only group to be written");
    };

    let settings = ScanSettings {
        scanner_name: "Internal Scanner".into(),
        ..ScanSettings::default()
    };
    let scan_name = dependent_scan_name(&pipeline.config().snapshot_label);
    ScanTrigger::new(store.as_ref(), &settings)
        .launch(reconciliation.group(), &scan_name)
        .await?;

    let scans = store.scans();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].name, "Agent Only Assets Remote Scan - nightly");
    assert_eq!(scans[0].target_group, reconciliation.group().id);
    assert_eq!(scans[0].template_uuid, "731a8e52-basic");
    assert_eq!(addr("10.5.5.5").to_string(), reconciliation.group().members.joined());
    Ok(())
}
