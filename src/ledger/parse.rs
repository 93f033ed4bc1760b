//! Parse an existing ledger document.
//!
//! Never fails: text that does not look like a ledger degrades to "no table",
//! with the unrecognized text kept as the preamble so nothing is dropped.

use crate::ledger::front_matter::{split_document, FrontMatter};
use crate::ledger::schema::{is_separator, ColumnLabels, TableSchema};

/// Why a document was only partially understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// Text present but no `---` delimited block at the top.
    MissingFrontMatter,
    /// Non-blank text but no header row carrying the mandatory column labels.
    MissingTable,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::MissingFrontMatter => write!(f, "no front matter block"),
            DegradeReason::MissingTable => write!(f, "no ledger table header"),
        }
    }
}

/// In-memory form of a ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerDocument {
    /// `None` for a fresh document or one without a front matter block.
    pub front_matter: Option<FrontMatter>,
    /// Text between the front matter and the table header, blank lines trimmed.
    pub preamble: String,
    /// Column layout of the existing table.
    pub schema: Option<TableSchema>,
    /// Existing data rows, trimmed, in document order.
    pub rows: Vec<String>,
}

impl LedgerDocument {
    /// Whether the merge has to synthesize front matter for this document.
    pub fn synthesized(&self) -> bool {
        self.front_matter.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLedger {
    pub document: LedgerDocument,
    pub degraded: Vec<DegradeReason>,
}

impl ParsedLedger {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

pub fn parse_ledger(text: &str, labels: &ColumnLabels) -> ParsedLedger {
    let mut degraded = Vec::new();

    let (front_matter, remainder) = match split_document(text) {
        Some((body, rest)) => (Some(FrontMatter::parse(body)), rest),
        None => {
            if !text.trim().is_empty() {
                degraded.push(DegradeReason::MissingFrontMatter);
            }
            (None, text)
        }
    };

    let mut offset = 0;
    let mut table = None;
    for line in remainder.split_inclusive('\n') {
        if let Some(schema) = TableSchema::detect(line, labels) {
            table = Some((offset, line, schema));
            break;
        }
        offset += line.len();
    }

    let document = match table {
        Some((start, header, schema)) => {
            let header = header.trim();
            let region = &remainder[start..];
            let rows = region
                .lines()
                .map(str::trim)
                .filter(|l| l.contains('|') && *l != header && !is_separator(l))
                .map(str::to_string)
                .collect();
            LedgerDocument {
                front_matter,
                preamble: trim_blank_lines(&remainder[..start]),
                schema: Some(schema),
                rows,
            }
        }
        None => {
            if !remainder.trim().is_empty() {
                degraded.push(DegradeReason::MissingTable);
            }
            LedgerDocument {
                front_matter,
                preamble: trim_blank_lines(remainder),
                schema: None,
                rows: Vec::new(),
            }
        }
    };

    ParsedLedger { document, degraded }
}

fn trim_blank_lines(text: &str) -> String {
    text.trim_start_matches(['\n', '\r']).trim_end().to_string()
}
