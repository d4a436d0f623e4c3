//! # Run and Watch Subcommands
//!
//! `valtab run` executes one update cycle against the configured site and
//! store, exactly as the HTTP trigger does. `valtab watch` repeats it on a
//! fixed interval until interrupted.
//!
//! Persistence goes to Postgres when `DATABASE_URL` is set and to a
//! process-local store otherwise, so an unconfigured `run` is a dry run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use valtab_api::db::{self, PgStore};
use valtab_api::state::{AppConfig, AppState, Collaborators};
use valtab_api::store::MemoryStore;
use valtab_client::{notifier_from_config, ClientConfig, NotifyConfig, NtaClient, PdfToText};
use valtab_update::report::replay_events;
use valtab_update::{CycleReport, PipelineConfig, UpdateCycle};

/// Arguments for the `valtab run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Postgres connection string. Without it nothing is persisted.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print the cycle report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `valtab watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Hours between cycles.
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_hours: u64,

    /// Postgres connection string. Without it nothing is persisted.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

async fn build_cycle(config: PipelineConfig, database_url: Option<&str>) -> Result<UpdateCycle> {
    let pipeline = Arc::new(config);
    let client = NtaClient::new(&ClientConfig::from_pipeline(&pipeline))
        .context("failed to build HTTP client")?;
    let notify = NotifyConfig::from_env().context("invalid notification configuration")?;
    let collaborators = Collaborators {
        documents: Arc::new(client),
        text: Arc::new(PdfToText::default()),
        notifier: notifier_from_config(&notify).context("failed to build notifier")?,
    };

    let state = match db::init_pool(database_url)
        .await
        .context("database initialization failed")?
    {
        Some(pool) => AppState::assemble(
            AppConfig::default(),
            pipeline,
            collaborators,
            Arc::new(PgStore::new(pool.clone())),
            Some(pool),
        ),
        None => AppState::assemble(
            AppConfig::default(),
            pipeline,
            collaborators,
            Arc::new(MemoryStore::new()),
            None,
        ),
    }
    .context("failed to build category registry")?;
    Ok(state.cycle)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Exit code for a finished cycle: 0 when every source succeeded.
pub fn exit_code(report: &CycleReport) -> u8 {
    if report.failures().next().is_some() {
        1
    } else {
        0
    }
}

fn print_report(report: &CycleReport) {
    for outcome in &report.outcomes {
        let period = outcome
            .period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:<10} {:<9} {period} persisted={} {}",
            outcome.rank,
            outcome.category.as_str(),
            outcome.status.as_str(),
            outcome.counts.persisted,
            outcome
                .error
                .as_deref()
                .or(outcome.reason.as_deref())
                .unwrap_or("")
        );
    }
    println!("finished in {} ms", report.duration_ms);
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 on success, 1 when any source failed, 2 when the
/// cycle aborted.
pub fn run_once(args: &RunArgs, config: PipelineConfig) -> Result<u8> {
    runtime()?.block_on(once(args, config))
}

async fn once(args: &RunArgs, config: PipelineConfig) -> Result<u8> {
    let cycle = build_cycle(config, args.database_url.as_deref()).await?;
    match cycle.run(Utc::now()).await {
        Ok(report) => {
            replay_events(&report.events);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(exit_code(&report))
        }
        Err(e) => {
            tracing::error!(error = %e, "update cycle aborted");
            println!("FAIL: {e}");
            Ok(2)
        }
    }
}

/// Execute the watch subcommand. Runs until Ctrl-C.
pub fn run_watch(args: &WatchArgs, config: PipelineConfig) -> Result<u8> {
    runtime()?.block_on(watch(args, config))
}

async fn watch(args: &WatchArgs, config: PipelineConfig) -> Result<u8> {
    let cycle = build_cycle(config, args.database_url.as_deref()).await?;
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_hours * 3600));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(interval_hours = args.interval_hours, "watching for updates");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match cycle.run(Utc::now()).await {
                    Ok(report) => {
                        replay_events(&report.events);
                        tracing::info!(
                            duration_ms = report.duration_ms,
                            failed = report.failures().count(),
                            updated = report.updated().count(),
                            "update cycle finished"
                        );
                    }
                    Err(e) => tracing::error!(error = %e, "update cycle aborted"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted; stopping");
                return Ok(0);
            }
        }
    }
}
