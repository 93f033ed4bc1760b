//! Ledger statistics.

use crate::report::entries::LedgerEntry;
use serde::Serialize;

const TOP_UPLOADERS: usize = 5;
const LATEST_UPLOADS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploaderCount {
    pub uploader: String,
    pub files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStatistics {
    pub total_files: usize,
    pub unique_uploaders: usize,
    /// Most active uploaders; ties keep the order of first appearance.
    pub top_uploaders: Vec<UploaderCount>,
    pub latest: Vec<LedgerEntry>,
}

pub fn statistics(entries: &[LedgerEntry]) -> LedgerStatistics {
    let mut counts: Vec<UploaderCount> = Vec::new();
    for entry in entries {
        match counts.iter_mut().find(|c| c.uploader == entry.uploader) {
            Some(count) => count.files += 1,
            None => counts.push(UploaderCount {
                uploader: entry.uploader.clone(),
                files: 1,
            }),
        }
    }
    let unique_uploaders = counts.len();
    counts.sort_by(|a, b| b.files.cmp(&a.files));
    counts.truncate(TOP_UPLOADERS);

    let mut latest: Vec<LedgerEntry> = entries.to_vec();
    latest.sort_by(LedgerEntry::newest_first);
    latest.truncate(LATEST_UPLOADS);

    LedgerStatistics {
        total_files: entries.len(),
        unique_uploaders,
        top_uploaders: counts,
        latest,
    }
}
