//! # valtab-cli — CLI Tool for Statutory Valuation Tables
//!
//! Provides the `valtab` command-line interface.
//!
//! ## Subcommands
//!
//! - `valtab discover`: List candidate and primary sources in a saved index page.
//! - `valtab extract`: Extract one record kind from a saved document.
//! - `valtab validate`: Validate a JSON array of records.
//! - `valtab run`: Run one update cycle against the live site.
//! - `valtab watch`: Run update cycles on a fixed interval.
//!
//! The first three work on local files only and never touch the network or
//! the database:
//!
//! ```bash
//! valtab discover index.htm
//! valtab extract comparable_industry r07.txt --year 2025 --month 6 > rows.json
//! valtab validate comparable_industry rows.json
//! ```
//!
//! Exit codes: 0 on success, 1 when the input failed a check, 2 on an
//! operational error.

pub mod discover;
pub mod extract;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use valtab_core::RecordBatch;
use valtab_update::PipelineConfig;

/// Load the pipeline configuration: optional YAML file, then `VALTAB_*`
/// environment overrides.
pub fn load_pipeline(path: Option<&Path>) -> Result<PipelineConfig> {
    PipelineConfig::load(path).context("failed to load pipeline configuration")
}

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// The records of `batch` as a bare JSON array, the shape `validate` reads.
pub fn records_json(batch: &RecordBatch) -> serde_json::Result<serde_json::Value> {
    match batch {
        RecordBatch::ComparableIndustry(rows) => serde_json::to_value(rows),
        RecordBatch::DividendReduction(rows) => serde_json::to_value(rows),
        RecordBatch::CompanySize(rows) => serde_json::to_value(rows),
    }
}
