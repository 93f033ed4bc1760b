//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "upload", "stats").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Upload { .. } => "upload",
        Commands::Merge { .. } => "merge",
        Commands::Search { .. } => "search",
        Commands::Stats { .. } => "stats",
        Commands::Validate => "validate",
    }
}
