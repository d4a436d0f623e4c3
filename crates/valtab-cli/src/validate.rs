//! # Validate Subcommand
//!
//! Runs the rule set for one record kind over a JSON array of records, such
//! as the output of `valtab extract` or a hand-prepared import.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use valtab_core::{RecordBatch, RecordKind};
use valtab_validate::{validate_batch, ValidationResult};

/// Arguments for the `valtab validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record kind: comparable_industry, dividend_reduction, or company_size.
    #[arg(value_name = "KIND")]
    pub kind: RecordKind,

    /// JSON array of records.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse and validate a JSON array of `kind` records.
pub fn validate_json(kind: RecordKind, json: &str) -> Result<ValidationResult> {
    let batch = RecordBatch::from_json(kind, json)
        .with_context(|| format!("input is not a JSON array of {kind} records"))?;
    Ok(validate_batch(&batch))
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the batch has no errors, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let json = crate::read_text(&args.input)?;
    let result = validate_json(args.kind, &json)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}: {}/{} records valid, quality score {}",
            args.kind,
            result.valid_count(),
            result.record_count,
            result.quality_score
        );
        for error in &result.errors {
            println!("  ERROR: {error}");
        }
        for warning in &result.warnings {
            println!("  WARN: {warning}");
        }
    }

    Ok(if result.is_valid { 0 } else { 1 })
}
