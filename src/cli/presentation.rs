//! CLI presentation: text and json formatters per command family.

mod report;
mod upload;

pub use report::{
    format_search_json, format_search_text, format_statistics_json, format_statistics_text,
};
pub use upload::{format_batch_report, format_merge_summary, format_validation_errors};
