//! Search and statistics over merged ledgers.

use super::test_utils::at;
use upload_ledger::ledger::{merge, ColumnLabels, MergeContext, UploadRecord};
use upload_ledger::report::{parse_entries, search, statistics, LedgerEntry};

fn ledger() -> String {
    let records: Vec<UploadRecord> = (1..=12)
        .map(|day| {
            let uploader = if day % 3 == 0 { "Ann" } else { "Bob" };
            UploadRecord::new(format!("report-{:02}.pdf", day), at(2024, 4, day, 9, 0))
                .with_size(day as u64 * 1024)
                .with_uploader(uploader)
                .with_location(if day % 2 == 0 { "Berlin" } else { "Oslo" })
                .with_download_url(format!("https://cdn.example/report-{:02}.pdf", day))
        })
        .collect();
    merge(None, &records, &MergeContext::new(at(2024, 5, 1, 0, 0))).unwrap()
}

fn entries() -> Vec<LedgerEntry> {
    parse_entries(&ledger(), &ColumnLabels::default())
}

#[test]
fn test_entries_read_back_every_column() {
    let entries = entries();
    assert_eq!(entries.len(), 12);
    let newest = &entries[0];
    assert_eq!(newest.file_name, "report-12.pdf");
    assert_eq!(newest.upload_time, "2024-04-12 09:00:00");
    assert_eq!(newest.file_size, "12 KB");
    assert_eq!(newest.uploader, "Ann");
    assert_eq!(newest.location, "Berlin");
    assert_eq!(
        newest.download_url.as_deref(),
        Some("https://cdn.example/report-12.pdf")
    );
}

#[test]
fn test_search_pages_through_matches() {
    let entries = entries();
    let first = search(&entries, "bob", 1, 5);
    assert_eq!(first.total_matches, 8);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.entries.len(), 5);
    assert_eq!(first.entries[0].file_name, "report-11.pdf");

    let second = search(&entries, "bob", 2, 5);
    assert_eq!(second.entries.len(), 3);
    assert_eq!(second.entries[2].file_name, "report-01.pdf");

    let past_end = search(&entries, "bob", 9, 5);
    assert_eq!(past_end.page, 2);
}

#[test]
fn test_search_matches_location_and_name() {
    let entries = entries();
    assert_eq!(search(&entries, "OSLO", 1, 50).total_matches, 6);
    assert_eq!(search(&entries, "report-0", 1, 50).total_matches, 9);
    assert_eq!(search(&entries, "nobody", 1, 50).entries.len(), 0);
}

#[test]
fn test_statistics_over_ledger() {
    let stats = statistics(&entries());
    assert_eq!(stats.total_files, 12);
    assert_eq!(stats.unique_uploaders, 2);
    assert_eq!(stats.top_uploaders[0].uploader, "Bob");
    assert_eq!(stats.top_uploaders[0].files, 8);
    assert_eq!(stats.top_uploaders[1].files, 4);
    assert_eq!(stats.latest.len(), 10);
    assert_eq!(stats.latest[0].file_name, "report-12.pdf");
    assert_eq!(stats.latest[9].file_name, "report-03.pdf");
}

#[test]
fn test_report_on_document_without_table() {
    let entries = parse_entries("just some notes", &ColumnLabels::default());
    assert!(entries.is_empty());
    let stats = statistics(&entries);
    assert_eq!(stats.total_files, 0);
    assert!(stats.top_uploaders.is_empty());
}
