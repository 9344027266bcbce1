mod commands;
mod terminal;

use std::process::ExitCode;
use std::sync::Arc;

use commands::{CommandLine, Commands, purge, sync};
use tgsync_common::config::{CAPACITY_CEILING, PipelineConfig};
use tgsync_core::network::TenableStore;
use tgsync_core::store::InventoryStore;
use tgsync_core::{CriterionKind, Pipeline};
use terminal::{logging, print};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLine::parse_args();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: CommandLine) -> anyhow::Result<()> {
    let api = cli.api_settings()?;
    let store = Arc::new(TenableStore::new(&api, CAPACITY_CEILING)?);
    let inventory: Arc<dyn InventoryStore> = store.clone();

    let mut cfg = PipelineConfig {
        dry_run: cli.dry_run,
        ..PipelineConfig::default()
    };
    let (verbose, quiet) = (cli.verbose, cli.quiet);

    match cli.command {
        Commands::AgentGroups => {
            print::header("syncing agent groups", quiet);
            let pipeline = Pipeline::new(inventory, cfg);
            sync::sync(&pipeline, CriterionKind::AgentGroups, verbose, quiet).await?;
        }
        Commands::Tags => {
            print::header("syncing tags", quiet);
            let pipeline = Pipeline::new(inventory, cfg);
            sync::sync(&pipeline, CriterionKind::Tags, verbose, quiet).await?;
        }
        Commands::Severity { levels } => {
            print::header("syncing severities", quiet);
            let pipeline = Pipeline::new(inventory, cfg);
            sync::sync(&pipeline, CriterionKind::Severity(levels), verbose, quiet).await?;
        }
        Commands::AgentOnly(args) => {
            print::header("syncing agent-only hosts", quiet);
            cfg.snapshot_label = args.label.clone().unwrap_or_else(snapshot_label);
            let pipeline = Pipeline::new(inventory, cfg);
            sync::agent_only(store, &pipeline, args, verbose, quiet).await?;
        }
        Commands::Purge {
            cidr,
            via_group,
            workers,
        } => {
            print::header("getting ready to purge", quiet);
            cfg.delete_workers = workers;
            let pipeline = Pipeline::new(inventory, cfg);
            purge::purge(&pipeline, cidr, via_group, quiet).await?;
        }
    }
    Ok(())
}

fn snapshot_label() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
}
