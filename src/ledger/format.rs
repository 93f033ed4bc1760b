//! Cell formatting for ledger rows.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Layout of the upload time cell.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendered in the link column when a record has no download URL.
pub const NO_LINK: &str = "no link";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A time cell anywhere in a row: `| 2024-01-02 10:20:30 |`, also with `/`
/// date separators or unpadded fields as older ledgers wrote them.
static ROW_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\|\s*(\d{4})[-/](\d{1,2})[-/](\d{1,2}) (\d{1,2}):(\d{2}):(\d{2})\s*\|")
        .expect("row time pattern is valid")
});

/// Render an upload time as `YYYY-MM-DD HH:MM:SS` in the display offset.
pub fn format_upload_time(time: &DateTime<Utc>, offset: &FixedOffset) -> String {
    time.with_timezone(offset).format(TIME_FORMAT).to_string()
}

/// Render a byte count with 1024-based units and at most two decimals.
///
/// `0 Bytes`, `100 Bytes`, `1 KB`, `1.5 KB`, `1.23 MB`; anything past GB stays in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{:.2}", scaled);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Markdown link for the download column, or [`NO_LINK`].
pub fn format_download_link(file_name: &str, url: Option<&str>) -> String {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => format!("[{}]({})", file_name.trim(), url),
        None => NO_LINK.to_string(),
    }
}

/// Extract the upload time from a rendered row, if any cell holds one.
pub fn parse_row_time(row: &str) -> Option<NaiveDateTime> {
    let caps = ROW_TIME_PATTERN.captures(row)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = chrono::NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?;
    date.and_hms_opt(field(4)?, field(5)?, field(6)?)
}

/// Split a table line into trimmed cells, dropping the outer pipes.
pub fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Join cells into a table line: `| a | b | c |`.
pub fn join_cells<S: AsRef<str>>(cells: &[S]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(cell.as_ref().trim());
        line.push_str(" |");
    }
    line
}
