//! # Extract Subcommand
//!
//! Extracts one record kind from a saved document and prints the records as
//! a JSON array. `.pdf` inputs go through `pdftotext` first; anything else
//! is read as UTF-8 text.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use valtab_client::{PdfToText, Utf8Passthrough};
use valtab_core::{RecordBatch, RecordKind};
use valtab_extract::CategoryRegistry;
use valtab_update::{PipelineConfig, TextExtractor};

/// Arguments for the `valtab extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Record kind: comparable_industry, dividend_reduction, or company_size.
    #[arg(value_name = "KIND")]
    pub kind: RecordKind,

    /// Document text (or a `.pdf`, converted with pdftotext).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Release year stamped on every record.
    #[arg(long)]
    pub year: i32,

    /// Release month stamped on every record.
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=12))]
    pub month: i32,

    /// Write the JSON here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Extract `kind` records from `text`.
pub fn extract_text(
    config: &PipelineConfig,
    kind: RecordKind,
    text: &str,
    year: i32,
    month: i32,
) -> Result<RecordBatch> {
    let registry =
        CategoryRegistry::new(config.era_base_year).context("failed to build category registry")?;
    Ok(registry.extract(kind, text, year, month))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn document_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let text = if is_pdf(path) {
        runtime.block_on(PdfToText::default().to_text(&bytes))
    } else {
        runtime.block_on(Utf8Passthrough.to_text(&bytes))
    };
    text.with_context(|| format!("failed to convert {}", path.display()))
}

/// Execute the extract subcommand.
///
/// Returns exit code: 0 when at least one record was extracted, 1 otherwise.
pub fn run_extract(args: &ExtractArgs, config: &PipelineConfig) -> Result<u8> {
    let text = document_text(&args.input)?;
    let batch = extract_text(config, args.kind, &text, args.year, args.month)?;
    tracing::info!(kind = %args.kind, records = batch.len(), "extracted");

    let json = serde_json::to_string_pretty(&crate::records_json(&batch)?)?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    if batch.is_empty() {
        eprintln!("WARN: no {} rows matched in {}", args.kind, args.input.display());
        return Ok(1);
    }
    Ok(0)
}
