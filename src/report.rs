//! Read-only views over a ledger document: entries, search, statistics.

pub mod entries;
pub mod search;
pub mod stats;

pub use entries::{parse_entries, LedgerEntry};
pub use search::{search, SearchPage, DEFAULT_PER_PAGE};
pub use stats::{statistics, LedgerStatistics, UploaderCount};
