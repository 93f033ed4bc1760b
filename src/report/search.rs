//! Paged, case-insensitive search over ledger entries.

use crate::report::entries::LedgerEntry;
use serde::Serialize;

pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub entries: Vec<LedgerEntry>,
    /// 1-based page actually returned after clamping.
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Entries whose file name, uploader or location contains `query`, newest first.
///
/// An empty query matches everything. `page` is clamped into
/// `1..=total_pages`; there is always at least one (possibly empty) page.
pub fn search(entries: &[LedgerEntry], query: &str, page: usize, per_page: usize) -> SearchPage {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.file_name.to_lowercase().contains(&needle)
                || entry.uploader.to_lowercase().contains(&needle)
                || entry.location.to_lowercase().contains(&needle)
        })
        .collect();
    matches.sort_by(|a, b| LedgerEntry::newest_first(a, b));

    let per_page = per_page.max(1);
    let total_matches = matches.len();
    let total_pages = total_matches.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    SearchPage {
        entries: matches
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect(),
        page,
        per_page,
        total_pages,
        total_matches,
    }
}
