//! Command-line argument definitions for the fibermap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the network document, the output
//! directory, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the fibermap tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML network document
    #[arg(help = "Path to the network document")]
    pub input: String,

    /// Directory receiving one SVG per sheet and the run report
    #[arg(short, long, default_value = "out")]
    pub output_dir: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Compute offsets without writing them back to the network document
    #[arg(long)]
    pub no_persist: bool,
}
