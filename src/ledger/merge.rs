//! Ledger merge: existing document text + new upload records -> new document text.

use crate::error::LedgerError;
use crate::ledger::format::{
    format_download_link, format_file_size, format_upload_time, join_cells, parse_row_time,
    split_cells, TIME_FORMAT,
};
use crate::ledger::front_matter::{DocumentTemplate, FrontMatter};
use crate::ledger::parse::{parse_ledger, DegradeReason, LedgerDocument};
use crate::ledger::record::UploadRecord;
use crate::ledger::schema::{Column, ColumnLabels, TableSchema};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Everything the merge needs besides its two inputs.
#[derive(Debug, Clone)]
pub struct MergeContext {
    /// Execution time; becomes `lastmod`.
    pub now: DateTime<Utc>,
    /// Offset used to render times in the document.
    pub offset: FixedOffset,
    /// Columns a table should carry. Mandatory columns are always added.
    pub columns: Vec<Column>,
    pub labels: ColumnLabels,
    pub template: DocumentTemplate,
}

impl MergeContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
            columns: Column::CANONICAL.to_vec(),
            labels: ColumnLabels::default(),
            template: DocumentTemplate::default(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_labels(mut self, labels: ColumnLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_template(mut self, template: DocumentTemplate) -> Self {
        self.template = template;
        self
    }
}

/// Result of a merge with the counters callers log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub text: String,
    pub total_rows: usize,
    pub existing_rows: usize,
    pub degraded: Vec<DegradeReason>,
}

/// Merge new records into the existing ledger text (or a fresh document).
pub fn merge(
    existing: Option<&str>,
    records: &[UploadRecord],
    ctx: &MergeContext,
) -> Result<String, LedgerError> {
    merge_detailed(existing, records, ctx).map(|outcome| outcome.text)
}

pub fn merge_detailed(
    existing: Option<&str>,
    records: &[UploadRecord],
    ctx: &MergeContext,
) -> Result<MergeOutcome, LedgerError> {
    if records.is_empty() {
        return Err(LedgerError::InvalidInput(
            "no upload records to merge".to_string(),
        ));
    }
    for record in records {
        record.validate()?;
    }

    let (document, degraded) = match existing {
        Some(text) => {
            let parsed = parse_ledger(text, &ctx.labels);
            for reason in &parsed.degraded {
                warn!(reason = %reason, "Existing ledger not fully recognized; keeping its text as preamble");
            }
            (parsed.document, parsed.degraded)
        }
        None => (LedgerDocument::default(), Vec::new()),
    };

    let schema = match &document.schema {
        Some(detected) => detected.upgraded(&ctx.columns),
        None => TableSchema::fresh(&ctx.columns),
    };

    let mut ordered: Vec<&UploadRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.upload_time.cmp(&a.upload_time));
    let new_rows = ordered
        .into_iter()
        .map(|record| render_row(record, &schema, ctx));

    let existing_rows = document.rows.iter().map(|row| match &document.schema {
        Some(from) => {
            let cells = split_cells(row);
            if cells.len() == from.width() {
                join_cells(&schema.relayout(from, &cells))
            } else {
                row.clone()
            }
        }
        None => row.clone(),
    });

    let mut seen = HashSet::new();
    let mut rows: Vec<(Option<NaiveDateTime>, String)> = new_rows
        .chain(existing_rows)
        .filter(|row| seen.insert(row.clone()))
        .map(|row| (parse_row_time(&row), row))
        .collect();
    rows.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let local_now = ctx.now.with_timezone(&ctx.offset);
    let lastmod = local_now.format(TIME_FORMAT).to_string();
    let synthesized = document.synthesized();
    let front_matter = match document.front_matter {
        Some(mut fm) => {
            fm.set_lastmod(&lastmod);
            fm
        }
        None => {
            let date = local_now.format("%Y-%m-%d").to_string();
            FrontMatter::fresh(&ctx.template, &fresh_slug(ctx, records), &date, &lastmod)
        }
    };

    let mut text = front_matter.render();
    text.push('\n');
    if !document.preamble.is_empty() {
        text.push_str(&document.preamble);
        text.push_str("\n\n");
    } else if synthesized {
        text.push_str(&format!("# {}\n\n", ctx.template.title));
        if !ctx.template.description.trim().is_empty() {
            text.push_str(ctx.template.description.trim());
            text.push_str("\n\n");
        }
    }
    text.push_str(&schema.header_line(&ctx.labels));
    text.push('\n');
    text.push_str(&schema.separator_line());
    text.push('\n');
    for (_, row) in &rows {
        text.push_str(row);
        text.push('\n');
    }

    debug!(
        new_records = records.len(),
        existing_rows = document.rows.len(),
        total_rows = rows.len(),
        columns = schema.width(),
        "Merged ledger"
    );

    Ok(MergeOutcome {
        text,
        total_rows: rows.len(),
        existing_rows: document.rows.len(),
        degraded,
    })
}

fn render_row(record: &UploadRecord, schema: &TableSchema, ctx: &MergeContext) -> String {
    let cells: Vec<String> = schema
        .columns()
        .iter()
        .map(|column| match column {
            Column::FileName => record.file_name.trim().to_string(),
            Column::UploadTime => format_upload_time(&record.upload_time, &ctx.offset),
            Column::FileSize => format_file_size(record.file_size_bytes),
            Column::Uploader => match record.uploader_name.trim() {
                "" => Column::Uploader.placeholder().to_string(),
                name => name.to_string(),
            },
            Column::Location => record.location().to_string(),
            Column::DownloadLink => {
                format_download_link(&record.file_name, record.download_url.as_deref())
            }
        })
        .collect();
    join_cells(&cells)
}

/// `<title> <8 hex>`; cosmetic, only needs to differ between documents.
fn fresh_slug(ctx: &MergeContext, records: &[UploadRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&ctx.now.timestamp_micros().to_le_bytes());
    for record in records {
        hasher.update(record.file_name.as_bytes());
    }
    let digest = hasher.finalize();
    format!("{} {}", ctx.template.title, hex::encode(&digest.as_bytes()[..4]))
}
