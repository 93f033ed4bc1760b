//! Ledger rows read back into structured entries.

use crate::ledger::format::{parse_row_time, split_cells};
use crate::ledger::{parse_ledger, Column, ColumnLabels, NO_LINK};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;

/// Target of a Markdown link cell: `[name](url)`.
static LINK_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(([^)\s]+)\)").expect("link pattern is valid"));

/// One ledger row. Columns the table lacks read as their placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub file_name: String,
    pub upload_time: String,
    #[serde(skip)]
    pub parsed_time: Option<NaiveDateTime>,
    pub file_size: String,
    pub uploader: String,
    pub location: String,
    pub download_url: Option<String>,
}

impl LedgerEntry {
    /// Newest first; entries without a readable time go last.
    pub fn newest_first(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
        match (&a.parsed_time, &b.parsed_time) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Entries of the ledger table in document order. Rows whose cell count
/// does not match the header are skipped.
pub fn parse_entries(text: &str, labels: &ColumnLabels) -> Vec<LedgerEntry> {
    let document = parse_ledger(text, labels).document;
    let Some(schema) = document.schema else {
        return Vec::new();
    };

    document
        .rows
        .iter()
        .filter_map(|row| {
            let cells = split_cells(row);
            if cells.len() != schema.width() {
                return None;
            }
            let cell = |column: Column| -> String {
                schema
                    .position(column)
                    .and_then(|i| cells.get(i))
                    .cloned()
                    .unwrap_or_else(|| column.placeholder().to_string())
            };
            let link = cell(Column::DownloadLink);
            Some(LedgerEntry {
                file_name: cell(Column::FileName),
                upload_time: cell(Column::UploadTime),
                parsed_time: parse_row_time(row),
                file_size: cell(Column::FileSize),
                uploader: cell(Column::Uploader),
                location: cell(Column::Location),
                download_url: link_target(&link),
            })
        })
        .collect()
}

fn link_target(cell: &str) -> Option<String> {
    if cell == NO_LINK {
        return None;
    }
    LINK_TARGET
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
