//! Search and statistics presentation.

use crate::error::ApiError;
use crate::report::{LedgerStatistics, SearchPage};
use comfy_table::Table;
use owo_colors::OwoColorize;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Output(e.to_string()))
}

pub fn format_search_text(page: &SearchPage) -> String {
    if page.total_matches == 0 {
        return "No matching uploads.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["File", "Uploaded", "Size", "Uploader", "Location", "Link"]);
    for entry in &page.entries {
        table.add_row(vec![
            entry.file_name.as_str(),
            entry.upload_time.as_str(),
            entry.file_size.as_str(),
            entry.uploader.as_str(),
            entry.location.as_str(),
            entry.download_url.as_deref().unwrap_or("-"),
        ]);
    }
    format!(
        "{}\nPage {}/{} ({} matches)",
        table, page.page, page.total_pages, page.total_matches
    )
}

pub fn format_search_json(page: &SearchPage) -> Result<String, ApiError> {
    to_json(page)
}

pub fn format_statistics_text(stats: &LedgerStatistics) -> String {
    let mut output = format!(
        "{}\n  Files: {}\n  Uploaders: {}\n",
        "Upload statistics".bold().underline(),
        stats.total_files,
        stats.unique_uploaders
    );

    if !stats.top_uploaders.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["#", "Uploader", "Files"]);
        for (i, count) in stats.top_uploaders.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                count.uploader.clone(),
                count.files.to_string(),
            ]);
        }
        output.push_str(&format!("\nTop uploaders\n{}\n", table));
    }

    if !stats.latest.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["File", "Uploaded", "Uploader"]);
        for entry in &stats.latest {
            table.add_row(vec![
                entry.file_name.as_str(),
                entry.upload_time.as_str(),
                entry.uploader.as_str(),
            ]);
        }
        output.push_str(&format!("\nLatest uploads\n{}", table));
    }
    output
}

pub fn format_statistics_json(stats: &LedgerStatistics) -> Result<String, ApiError> {
    to_json(stats)
}
