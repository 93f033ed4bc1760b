//! Upload ledger document model and merge.
//!
//! A ledger is a Markdown document: a `---` delimited front matter block,
//! optional prose, then one pipe table with a row per uploaded file, newest
//! first. [`merge`] folds new upload records into an existing document (or
//! creates one) without losing rows, prose or unknown front matter fields.

pub mod format;
pub mod front_matter;
pub mod merge;
pub mod parse;
pub mod record;
pub mod schema;

pub use format::{format_download_link, format_file_size, format_upload_time, NO_LINK, TIME_FORMAT};
pub use front_matter::{DocumentTemplate, FrontMatter};
pub use merge::{merge, merge_detailed, MergeContext, MergeOutcome};
pub use parse::{parse_ledger, DegradeReason, LedgerDocument, ParsedLedger};
pub use record::{parse_upload_time, UploadRecord, DEFAULT_LOCATION};
pub use schema::{Column, ColumnLabels, TableSchema};
