use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::*;
use tgsync_common::network::Cidr;
use tgsync_core::executor::ProgressFn;
use tgsync_core::{Pipeline, PurgeOutcome};

use crate::terminal::{colors, format, print, progress};
use crate::tprint;

pub async fn purge(pipeline: &Pipeline, cidr: Cidr, via_group: bool, quiet: u8) -> anyhow::Result<()> {
    let start_time: Instant = Instant::now();
    let plan = pipeline
        .plan_purge(cidr, via_group)
        .await
        .with_context(|| format!("Failed to find assets in {cidr}"))?;

    print::header("purge", quiet);
    print::aligned_line("Scope", plan.scope.to_string());
    print::aligned_line("Matched", plan.matches.len().to_string().color(colors::ACCENT));

    if plan.matches.is_empty() {
        print::no_results();
        return Ok(());
    }

    let bar = (!pipeline.config().dry_run)
        .then(|| progress::start(plan.matches.len() as u64, "Deleting assets"));
    let on_progress: Option<ProgressFn> = bar.clone().map(|tick| -> ProgressFn {
        Arc::new(move |done| tick.set_position(done as u64))
    });

    match pipeline.execute_purge(plan, on_progress).await {
        PurgeOutcome::Planned { matches, .. } => {
            tprint!();
            print::tree_head(0, "Would delete");
            print::as_tree_one_level(format::asset_ids(&matches));
            return Ok(());
        }
        PurgeOutcome::Purged { report, .. } => {
            if let Some(bar) = &bar {
                progress::finish(bar);
            }
            print::aligned_line("Deleted", report.succeeded.to_string().green().bold());
            print::aligned_line("Failed", report.failed.len().to_string().red().bold());
            if !report.failed.is_empty() {
                tprint!();
                print::tree_head(0, "Not deleted");
                print::as_tree_one_level(format::asset_ids(&report.failed));
            }
        }
    }

    let total_time: ColoredString = format!("{:.2}s", start_time.elapsed().as_secs_f64())
        .bold()
        .yellow();
    if quiet == 0 {
        print::fat_separator();
        print::centerln(&format!("Purge Complete in {total_time}"));
    }
    Ok(())
}
