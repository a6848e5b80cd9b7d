pub mod analyze;
pub mod segment;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "inci",
    about = "Ingredient label segmentation and reconciliation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Segment recognized label text into ingredient tokens
    Segment {
        /// Text file with raw recognizer output ("-" for stdin)
        file: PathBuf,
    },
    /// Segment and reconcile tokens against the reference service
    Analyze {
        /// Text file with raw recognizer output, or a JSON observation
        /// list with --observations ("-" for stdin)
        file: PathBuf,
        /// Reference service search endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Minimum seconds between service requests
        #[arg(long = "rate-limit", default_value_t = 1)]
        rate_limit: u64,
        /// Write the full analysis JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Treat the input as a JSON array of recognizer observations
        #[arg(long)]
        observations: bool,
    },
}
