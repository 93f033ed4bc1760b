//! CLI parse: clap types for upload-ledger. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Upload files to a repository and keep a Markdown ledger of every upload
#[derive(Parser)]
#[command(name = "upload-ledger")]
#[command(about = "Upload files and maintain a Markdown upload ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where config/ is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload files and add them to the ledger
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Name recorded as the uploader
        #[arg(long)]
        uploader: String,
        /// Location recorded for the uploader
        #[arg(long)]
        location: Option<String>,
        /// Upload password, when one is configured
        #[arg(long)]
        password: Option<String>,
    },
    /// Merge records into a local ledger file without touching any store
    Merge {
        /// Ledger Markdown file; created when missing
        #[arg(long)]
        ledger: PathBuf,
        /// JSON file holding an array of upload records
        #[arg(long)]
        records: PathBuf,
        /// Print the merged document instead of writing the ledger file
        #[arg(long)]
        stdout: bool,
    },
    /// Search ledger entries by file name, uploader or location
    Search {
        /// Case-insensitive search text; omit to list everything
        query: Option<String>,
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
        /// Entries per page
        #[arg(long, default_value = "10")]
        per_page: usize,
        /// Read a local ledger file instead of the configured store
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show ledger statistics
    Stats {
        /// Read a local ledger file instead of the configured store
        #[arg(long)]
        ledger: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate configuration
    Validate,
}
