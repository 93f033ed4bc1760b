//! Ledger publishing against stores that report concurrent changes.

use super::test_utils::{at, FlakyStore};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use upload_ledger::config::LedgerConfig;
use upload_ledger::error::ApiError;
use upload_ledger::ledger::UploadRecord;
use upload_ledger::publish::LedgerPublisher;
use upload_ledger::store::MemoryStore;

const LEDGER_PATH: &str = "content/post/upload-records.md";

const SEEDED: &str = "---\ntitle: Upload Records\nlastmod: 2024-01-01 00:00:00\n---\n\n| File Name | Upload Time | File Size | Uploader | Location | Download |\n|------|------|------|------|------|------|\n| seed.txt | 2024-01-01 00:00:00 | 1 KB | Ann | unknown | no link |\n";

fn record(name: &str, day: u32) -> UploadRecord {
    UploadRecord::new(name, at(2024, 3, day, 12, 0))
        .with_size(10)
        .with_uploader("Bob")
}

#[tokio::test]
async fn test_publish_retries_after_conflict() {
    let inner = MemoryStore::new();
    inner.insert(LEDGER_PATH, SEEDED);
    let store = Arc::new(FlakyStore::new(inner).with_conflicts(LEDGER_PATH, 2));
    let publisher = LedgerPublisher::new(store.clone(), LedgerConfig::default());

    let report = publisher.publish(&[record("a.txt", 1)]).await.unwrap();
    assert_eq!(report.attempts, 3);
    assert!(!report.created);
    assert_eq!(report.total_rows, 2);
    assert_eq!(store.puts.load(Ordering::SeqCst), 3);

    let text = store.inner.get_text(LEDGER_PATH).unwrap();
    assert!(text.contains("| a.txt |"));
    assert!(text.contains("| seed.txt |"));
}

#[tokio::test]
async fn test_publish_gives_up_after_max_attempts() {
    let inner = MemoryStore::new();
    inner.insert(LEDGER_PATH, SEEDED);
    let store = Arc::new(FlakyStore::new(inner).with_conflicts(LEDGER_PATH, 10));
    let publisher = LedgerPublisher::new(store.clone(), LedgerConfig::default());

    let err = publisher.publish(&[record("a.txt", 1)]).await.unwrap_err();
    match err {
        ApiError::ConflictRetriesExhausted { path, attempts } => {
            assert_eq!(path, LEDGER_PATH);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.inner.get_text(LEDGER_PATH).as_deref(), Some(SEEDED));
}

#[tokio::test]
async fn test_concurrent_writer_rows_survive_retry() {
    let other_writer = SEEDED.replace(
        "| seed.txt |",
        "| other.txt | 2024-02-01 00:00:00 | 2 KB | Carl | Oslo | no link |\n| seed.txt |",
    );
    let inner = MemoryStore::new();
    inner.insert(LEDGER_PATH, SEEDED);
    let store = Arc::new(
        FlakyStore::new(inner)
            .with_conflicts(LEDGER_PATH, 1)
            .with_interleaved_write(LEDGER_PATH, &other_writer),
    );
    let publisher = LedgerPublisher::new(store.clone(), LedgerConfig::default());

    let report = publisher.publish(&[record("mine.txt", 5)]).await.unwrap();
    assert_eq!(report.attempts, 2);
    assert_eq!(report.total_rows, 3);

    let text = store.inner.get_text(LEDGER_PATH).unwrap();
    let mine = text.find("| mine.txt |").unwrap();
    let other = text.find("| other.txt |").unwrap();
    let seed = text.find("| seed.txt |").unwrap();
    assert!(mine < other && other < seed);
}

#[tokio::test]
async fn test_publish_creates_missing_ledger_with_configured_path() {
    let store = Arc::new(MemoryStore::new());
    let ledger = LedgerConfig {
        directory: "docs".to_string(),
        file_name: "files.md".to_string(),
        display_offset_minutes: 480,
        ..LedgerConfig::default()
    };
    let publisher = LedgerPublisher::new(store.clone(), ledger);

    let report = publisher
        .publish_at(&[record("a.txt", 1)], at(2024, 3, 2, 0, 0))
        .await
        .unwrap();
    assert!(report.created);
    assert_eq!(report.path, "docs/files.md");

    let text = store.get_text("docs/files.md").unwrap();
    assert!(text.contains("lastmod: 2024-03-02 08:00:00\n"));
    assert!(text.contains("| a.txt | 2024-03-01 20:00:00 | 10 Bytes | Bob | unknown | no link |"));
}

#[tokio::test]
async fn test_history_failure_leaves_ledger_published() {
    let inner = MemoryStore::new();
    inner.insert("log/uploadlog.json", "[]");
    let store = Arc::new(FlakyStore::new(inner).with_conflicts("log/uploadlog.json", 10));
    let ledger = LedgerConfig {
        history_path: Some("log/uploadlog.json".to_string()),
        ..LedgerConfig::default()
    };
    let publisher = LedgerPublisher::new(store.clone(), ledger);

    let report = publisher.publish(&[record("a.txt", 1)]).await.unwrap();
    assert!(!report.history_recorded);
    assert!(store.inner.get_text(LEDGER_PATH).unwrap().contains("| a.txt |"));
    assert_eq!(store.inner.get_text("log/uploadlog.json").as_deref(), Some("[]"));
}
