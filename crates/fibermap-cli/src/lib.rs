//! CLI logic for the fibermap tool.
//!
//! Loads a network document, propagates offsets, lays out the topology and
//! the wiring tables, and writes one SVG per sheet plus a `report.toml`
//! summary into the output directory.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::{debug, info, warn};
use serde::Serialize;

use fibermap::{
    FibermapError, TopologyBuilder,
    report::{GenerationReport, Status},
};

/// File name of the run summary written next to the sheets.
pub const REPORT_FILE: &str = "report.toml";

/// Serialized summary of one run.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    input: &'a str,
    status: String,
    persisted: bool,
    sheets: &'a [String],
    issues: Vec<String>,
}

impl<'a> RunSummary<'a> {
    fn new(args: &'a Args, report: &'a GenerationReport) -> Self {
        Self {
            input: &args.input,
            status: report.status().to_string(),
            persisted: !args.no_persist,
            sheets: report.sheets(),
            issues: report.issues().iter().map(ToString::to_string).collect(),
        }
    }
}

/// Run the fibermap CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `FibermapError` for:
/// - Configuration loading errors
/// - Network document loading errors
/// - Repository read or offset write failures
/// - Export errors
pub fn run(args: &Args) -> Result<Status, FibermapError> {
    info!(
        input_path = args.input,
        output_dir = args.output_dir,
        no_persist = args.no_persist;
        "Processing network"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let mut network = fibermap::open_network(&args.input)?;
    let resolved = network.resolve_extremities();
    debug!(resolved; "Segment extremities resolved");

    let builder = TopologyBuilder::new(app_config);
    let (workbook, report) = if args.no_persist {
        let mut scratch = network.memory().clone();
        builder.generate(&mut scratch)?
    } else {
        builder.generate(&mut network)?
    };

    for issue in report.issues() {
        warn!(issue:%; "Generation issue");
    }

    let output_dir = Path::new(&args.output_dir);
    fs::create_dir_all(output_dir)?;
    let written = builder.export_svg(&workbook, output_dir)?;

    let summary = toml::to_string_pretty(&RunSummary::new(args, &report))
        .map_err(|err| FibermapError::Export(err.to_string()))?;
    fs::write(output_dir.join(REPORT_FILE), summary)?;

    info!(
        status:% = report.status(),
        files = written,
        output_dir = args.output_dir;
        "Topology exported"
    );

    Ok(report.status())
}
