use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use colored::*;
use tgsync_common::config::ScanSettings;
use tgsync_core::network::TenableStore;
use tgsync_core::pipeline::dependent_scan_name;
use tgsync_core::reconciler::Reconciliation;
use tgsync_core::scan::ScanTrigger;
use tgsync_core::{CriterionKind, Pipeline, SyncOutcome, SyncReport};
use tracing::warn;

use crate::commands::AgentOnlyArgs;
use crate::terminal::format::{self, Detail, MEMBER_PREVIEW};
use crate::terminal::{colors, print};
use crate::tprint;

pub async fn sync(
    pipeline: &Pipeline,
    kind: CriterionKind,
    verbose: u8,
    quiet: u8,
) -> anyhow::Result<Vec<SyncReport>> {
    let start_time: Instant = Instant::now();
    let criteria = pipeline
        .discover_criteria(kind)
        .await
        .context("Failed to list grouping criteria")?;

    if criteria.is_empty() {
        print::header("nothing to sync", quiet);
        print::no_results();
        return Ok(Vec::new());
    }

    let reports = pipeline.sync_all(criteria).await;

    print::header("target groups", quiet);
    print_reports(&reports, verbose, quiet);
    print_summary(&reports, start_time.elapsed(), quiet);

    if reports.iter().all(|report| report.outcome.is_err()) {
        bail!("Every criterion failed");
    }
    Ok(reports)
}

pub async fn agent_only(
    store: Arc<TenableStore>,
    pipeline: &Pipeline,
    args: AgentOnlyArgs,
    verbose: u8,
    quiet: u8,
) -> anyhow::Result<()> {
    let reports = sync(pipeline, CriterionKind::AgentOnly(args.cidrs), verbose, quiet).await?;
    if !args.launch_scan {
        return Ok(());
    }

    let group = reports.iter().find_map(|report| match &report.outcome {
        Ok(SyncOutcome::Synced { reconciliation, .. }) => Some(reconciliation.group()),
        _ => None,
    });
    let Some(group) = group else {
        warn!("No group was written, not launching a scan");
        return Ok(());
    };

    let settings = ScanSettings {
        scanner_name: args.scanner.unwrap_or_default(),
        folder_name: args.folder,
        template_name: args.template,
    };
    let scan_name = dependent_scan_name(&pipeline.config().snapshot_label);
    let scan_id = ScanTrigger::new(&*store, &settings)
        .launch(group, &scan_name)
        .await
        .with_context(|| format!("Failed to launch '{scan_name}'"))?;

    tprint!();
    print::aligned_line("Scan", scan_name);
    print::aligned_line("Scan id", scan_id.0.color(colors::ACCENT));
    Ok(())
}

fn print_reports(reports: &[SyncReport], verbose: u8, quiet: u8) {
    for (idx, report) in reports.iter().enumerate() {
        if quiet < 2 {
            print_report_tree(report, idx, verbose);
        }
        if idx + 1 != reports.len() {
            tprint!();
        }
    }
}

fn print_report_tree(report: &SyncReport, idx: usize, verbose: u8) {
    let limit = if verbose > 0 { None } else { Some(MEMBER_PREVIEW) };

    let (name, details): (String, Vec<Detail>) = match &report.outcome {
        Ok(SyncOutcome::Synced {
            reconciliation,
            list,
        }) => {
            let mut details = vec![
                ("Action".to_string(), format::action(reconciliation.action())),
                ("Members".to_string(), list.len().to_string().normal()),
            ];
            if let Reconciliation::Updated { previous, .. } = reconciliation {
                details.push(("Before".to_string(), previous.len().to_string().normal()));
            }
            if list.dropped() > 0 {
                details.push(("Dropped".to_string(), list.dropped().to_string().normal()));
            }
            details.extend(format::members_to_details(list, limit));
            (reconciliation.group().name.clone(), details)
        }
        Ok(SyncOutcome::Planned { name, list }) => {
            let mut details = vec![
                ("Action".to_string(), format::action("planned")),
                ("Members".to_string(), list.len().to_string().normal()),
            ];
            details.extend(format::members_to_details(list, limit));
            (name.clone(), details)
        }
        Ok(SyncOutcome::Skipped { name }) => (
            name.clone(),
            vec![("Action".to_string(), format::action("skipped"))],
        ),
        Err(e) => (
            report.criterion.to_string(),
            vec![
                ("Action".to_string(), format::action("failed")),
                ("Error".to_string(), e.to_string().color(colors::FAILED)),
            ],
        ),
    };

    print::tree_head(idx, &name);
    print::as_tree_one_level(details);
}

fn print_summary(reports: &[SyncReport], total_time: Duration, quiet: u8) {
    let mut written = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for report in reports {
        match &report.outcome {
            Ok(SyncOutcome::Skipped { .. }) => skipped += 1,
            Ok(_) => written += 1,
            Err(_) => failed += 1,
        }
    }

    let written: ColoredString = format!("{written} groups").bold().green();
    let skipped: ColoredString = format!("{skipped} skipped").bold().yellow();
    let failed: ColoredString = format!("{failed} failed").bold().red();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Sync Complete: {written}, {skipped}, {failed} in {total_time}")
            .color(colors::TEXT_DEFAULT);

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            tprint!();
            print::print(&output.to_string());
        }
    }
}
