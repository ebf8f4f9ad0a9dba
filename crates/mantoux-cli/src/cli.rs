//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default cache file location, shared by all subcommands.
pub const DEFAULT_CACHE: &str = "data/tb_surveillance.csv";

/// Mantoux: WHO TB surveillance analysis engine
#[derive(Parser)]
#[command(name = "mantoux")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the surveillance CSV into the local cache file
    Fetch {
        /// Cache file to write
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Remote CSV source
        #[arg(long)]
        url: String,

        /// Re-download even if the cache file exists
        #[arg(long)]
        force: bool,
    },

    /// Run one analysis against the cached dataset
    Analyze {
        /// Analysis type (incidence, mdr_ratio, xdr_ratio, yoy_growth,
        /// cagr, correlation, outliers, summary_stats)
        #[arg(value_name = "KIND")]
        kind: String,

        /// Restrict to one country
        #[arg(short, long)]
        country: Option<String>,

        /// First year of the range (inclusive)
        #[arg(long)]
        from: Option<i32>,

        /// Last year of the range (inclusive)
        #[arg(long)]
        to: Option<i32>,

        /// Cache file to read
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report data-quality findings for the cached dataset
    Validate {
        /// Cache file to read
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the dataset or one analysis as CSV
    Export {
        /// Cache file to read
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Analysis type to export (omit to export the dataset itself)
        #[arg(short, long)]
        kind: Option<String>,

        /// Restrict to one country
        #[arg(short, long)]
        country: Option<String>,

        /// First year of the range (inclusive)
        #[arg(long)]
        from: Option<i32>,

        /// Last year of the range (inclusive)
        #[arg(long)]
        to: Option<i32>,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Cache file backing the dataset
        #[arg(long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,

        /// Remote CSV source used by refresh requests
        #[arg(long)]
        url: Option<String>,

        /// Port to listen on
        #[arg(short, long, default_value = "3141")]
        port: u16,
    },
}
