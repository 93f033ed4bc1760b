//! Table schema: which columns a ledger table carries, and in what order.
//!
//! The file name, upload time and download link columns are mandatory. Size,
//! uploader and location are optional. A schema detected from an existing
//! header keeps its order; upgrading only ever appends columns.

use crate::ledger::format::{join_cells, split_cells, NO_LINK};
use crate::ledger::record::DEFAULT_LOCATION;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    FileName,
    UploadTime,
    FileSize,
    Uploader,
    Location,
    DownloadLink,
}

impl Column {
    /// Column order used for a brand-new table.
    pub const CANONICAL: [Column; 6] = [
        Column::FileName,
        Column::UploadTime,
        Column::FileSize,
        Column::Uploader,
        Column::Location,
        Column::DownloadLink,
    ];

    pub const MANDATORY: [Column; 3] = [Column::FileName, Column::UploadTime, Column::DownloadLink];

    pub fn is_mandatory(self) -> bool {
        Self::MANDATORY.contains(&self)
    }

    /// Cell value given to pre-existing rows when the column is added to their table.
    pub fn placeholder(self) -> &'static str {
        match self {
            Column::FileName | Column::UploadTime => "unknown",
            Column::FileSize => "unknown size",
            Column::Uploader => "unknown uploader",
            Column::Location => DEFAULT_LOCATION,
            Column::DownloadLink => NO_LINK,
        }
    }
}

/// Header labels, one per column. Configurable so existing ledgers written with
/// other labels are still recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabels {
    #[serde(default = "default_file_name_label")]
    pub file_name: String,
    #[serde(default = "default_upload_time_label")]
    pub upload_time: String,
    #[serde(default = "default_file_size_label")]
    pub file_size: String,
    #[serde(default = "default_uploader_label")]
    pub uploader: String,
    #[serde(default = "default_location_label")]
    pub location: String,
    #[serde(default = "default_download_link_label")]
    pub download_link: String,
}

fn default_file_name_label() -> String {
    "File Name".to_string()
}

fn default_upload_time_label() -> String {
    "Upload Time".to_string()
}

fn default_file_size_label() -> String {
    "File Size".to_string()
}

fn default_uploader_label() -> String {
    "Uploader".to_string()
}

fn default_location_label() -> String {
    "Location".to_string()
}

fn default_download_link_label() -> String {
    "Download".to_string()
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            file_name: default_file_name_label(),
            upload_time: default_upload_time_label(),
            file_size: default_file_size_label(),
            uploader: default_uploader_label(),
            location: default_location_label(),
            download_link: default_download_link_label(),
        }
    }
}

impl ColumnLabels {
    pub fn label(&self, column: Column) -> &str {
        match column {
            Column::FileName => &self.file_name,
            Column::UploadTime => &self.upload_time,
            Column::FileSize => &self.file_size,
            Column::Uploader => &self.uploader,
            Column::Location => &self.location,
            Column::DownloadLink => &self.download_link,
        }
    }

    /// Column whose label equals the trimmed cell text.
    pub fn column_for(&self, cell: &str) -> Option<Column> {
        let cell = cell.trim();
        Column::CANONICAL
            .into_iter()
            .find(|c| self.label(*c) == cell)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for column in Column::CANONICAL {
            let label = self.label(column).trim();
            if label.is_empty() {
                return Err(format!("label for {:?} cannot be empty", column));
            }
            if label.contains('|') {
                return Err(format!("label for {:?} cannot contain '|'", column));
            }
            if !seen.insert(label.to_string()) {
                return Err(format!("label '{}' is used for more than one column", label));
            }
        }
        Ok(())
    }
}

/// Ordered column set of a ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Schema for a new table: the configured columns plus the mandatory ones,
    /// in canonical order.
    pub fn fresh(configured: &[Column]) -> Self {
        let columns = Column::CANONICAL
            .into_iter()
            .filter(|c| c.is_mandatory() || configured.contains(c))
            .collect();
        Self { columns }
    }

    /// Recognize a header line. Every cell must be a known label, no label may
    /// repeat, and all mandatory columns must be present.
    pub fn detect(line: &str, labels: &ColumnLabels) -> Option<Self> {
        if !line.contains('|') {
            return None;
        }
        let mut columns = Vec::new();
        for cell in split_cells(line) {
            let column = labels.column_for(&cell)?;
            if columns.contains(&column) {
                return None;
            }
            columns.push(column);
        }
        if Column::MANDATORY.iter().all(|c| columns.contains(c)) {
            Some(Self { columns })
        } else {
            None
        }
    }

    /// This schema with every configured column it lacks appended, canonical order.
    pub fn upgraded(&self, configured: &[Column]) -> Self {
        let mut columns = self.columns.clone();
        for column in Column::CANONICAL {
            if configured.contains(&column) && !columns.contains(&column) {
                columns.push(column);
            }
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn header_line(&self, labels: &ColumnLabels) -> String {
        let cells: Vec<&str> = self.columns.iter().map(|c| labels.label(*c)).collect();
        join_cells(&cells)
    }

    pub fn separator_line(&self) -> String {
        let mut line = String::from("|");
        for _ in &self.columns {
            line.push_str("------|");
        }
        line
    }

    /// Map cells laid out in `from` into this schema, filling gaps with placeholders.
    pub fn relayout(&self, from: &TableSchema, cells: &[String]) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                from.position(*column)
                    .and_then(|i| cells.get(i))
                    .cloned()
                    .unwrap_or_else(|| column.placeholder().to_string())
            })
            .collect()
    }
}

/// A table separator line: pipes, dashes, colons and whitespace only.
pub fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed.contains('|')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}
