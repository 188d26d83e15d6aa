//! # Audit CLI: Store-wide consistency report.
//!
//! ```bash
//! atlas audit --store atlas.yaml
//! atlas audit --store atlas.json --format json
//! ```
//!
//! Prints a human summary by default, or the full report with `--format`.
//! Exits `1` when the report has errors; warnings alone do not fail.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use atlas_hierarchy::{audit, AuditReport, EngineConfig};

use crate::{load_store, render, OutputFormat};

/// Audit arguments.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Snapshot file.
    #[arg(long)]
    pub store: PathBuf,

    /// Print the full report in this format instead of a summary.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the audit command.
pub fn run_audit(args: &AuditArgs, config: &EngineConfig) -> Result<u8> {
    let store = load_store(&args.store)?;
    let report = audit(&store, config)?;
    match args.format {
        Some(format) => print!("{}", render(&report, format)?),
        None => print_summary(&report),
    }
    Ok(if report.ok { 0 } else { 1 })
}

fn print_summary(report: &AuditReport) {
    println!(
        "Audited {} profiles, {} region groups, {} places",
        report.counts.country_profiles, report.counts.region_groups, report.counts.atlas_places
    );
    for finding in &report.errors {
        println!("  ERROR   [{:?}] {finding}", finding.check);
    }
    for finding in &report.warnings {
        println!("  WARNING [{:?}] {finding}", finding.check);
    }
    println!();
    println!(
        "{}: {} errors, {} warnings",
        if report.ok { "OK" } else { "FAILED" },
        report.errors.len(),
        report.warnings.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(snapshot: &str, format: Option<OutputFormat>) -> u8 {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("atlas.yaml");
        std::fs::write(&store, snapshot).unwrap();
        run_audit(&AuditArgs { store, format }, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn clean_store_passes() {
        let snapshot = "places:\n  - {id: 1, place_id: country-de, place_type: country, country_code: DE}\n";
        assert_eq!(run(snapshot, None), 0);
        assert_eq!(run(snapshot, Some(OutputFormat::Json)), 0);
    }

    #[test]
    fn orphaned_place_fails() {
        let snapshot = "places:\n  - {id: 1, place_id: city-de-berlin, place_type: city, country_code: DE}\n";
        assert_eq!(run(snapshot, None), 1);
    }

    #[test]
    fn missing_store_is_an_error() {
        let args = AuditArgs {
            store: PathBuf::from("/nonexistent/atlas.yaml"),
            format: None,
        };
        assert!(run_audit(&args, &EngineConfig::default()).is_err());
    }
}
