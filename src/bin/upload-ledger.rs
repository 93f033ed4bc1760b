//! upload-ledger CLI Binary
//!
//! Command-line interface for uploading files and maintaining the upload ledger.

use clap::Parser;
use std::borrow::Cow;
use std::process;
use tracing::{error, info};
use upload_ledger::cli::{Cli, RunContext};
use upload_ledger::config::ConfigLoader;
use upload_ledger::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("upload-ledger starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", upload_ledger::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            print!("{}", newline_terminated(&output));
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", upload_ledger::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Command output ending in exactly the newlines it carries, or one if it has none.
fn newline_terminated(output: &str) -> Cow<'_, str> {
    if output.ends_with('\n') {
        Cow::Borrowed(output)
    } else {
        Cow::Owned(format!("{}\n", output))
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.level = "off".to_string();
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
