//! # Discover Subcommand
//!
//! Runs source discovery and primary selection over a saved index page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use valtab_core::{DiscoveredSource, SourceCategory};
use valtab_extract::{discover, parse_base_url, CategoryRegistry, ExtractError};
use valtab_update::{select_primary, PipelineConfig, PrimarySource};

/// Arguments for the `valtab discover` subcommand.
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Saved index page (HTML or text).
    #[arg(value_name = "INDEX")]
    pub index: PathBuf,

    /// Base URL relative links resolve against. Defaults to the configured base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print JSON instead of a listing.
    #[arg(long)]
    pub json: bool,
}

/// What discovery found.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverReport {
    /// Candidates per category, in discovery order.
    pub candidates: Vec<(SourceCategory, Vec<DiscoveredSource>)>,
    /// Selected primary sources, in rank order.
    pub primary: Vec<PrimarySource>,
}

/// Discover sources in `index_text` and select the primary ones.
pub fn discover_sources(
    config: &PipelineConfig,
    index_text: &str,
    base_url: Option<&str>,
) -> Result<DiscoverReport, ExtractError> {
    let registry = CategoryRegistry::new(config.era_base_year)?;
    let base = parse_base_url(base_url.unwrap_or(&config.base_url))?;
    let found = discover(&registry, index_text, &base, &config.required_categories)?;
    Ok(DiscoverReport {
        candidates: found
            .iter()
            .map(|(category, sources)| (category, sources.to_vec()))
            .collect(),
        primary: select_primary(&found),
    })
}

/// Execute the discover subcommand.
///
/// Returns exit code: 0 on success, 1 when a required category is missing.
pub fn run_discover(args: &DiscoverArgs, config: &PipelineConfig) -> Result<u8> {
    let text = crate::read_text(&args.index)?;
    let report = match discover_sources(config, &text, args.base_url.as_deref()) {
        Ok(report) => report,
        Err(e @ ExtractError::MandatorySourceNotFound { .. }) => {
            println!("FAIL: {e}");
            return Ok(1);
        }
        Err(e) => return Err(e).context("discovery failed"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(0);
    }

    for (category, sources) in &report.candidates {
        println!("{category}: {} candidate(s)", sources.len());
        for source in sources {
            let marker = if source.is_usable() { " " } else { "?" };
            println!("  {marker} {}", source.url);
        }
    }
    println!();
    for primary in &report.primary {
        let when = match (primary.source.period(), primary.source.amendment_id) {
            (Some(period), _) => period.to_string(),
            (None, Some(id)) => format!("#{id}"),
            (None, None) => "-".to_string(),
        };
        println!(
            "PRIMARY {} {} ({when}) {}",
            primary.rank, primary.source.category, primary.source.url
        );
    }
    Ok(0)
}
