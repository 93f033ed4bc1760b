//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_batch_report, format_merge_summary, format_search_json, format_search_text,
    format_statistics_json, format_statistics_text, format_validation_errors,
};
pub use route::RunContext;
