//! Property-based tests for ledger merge invariants

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use upload_ledger::ledger::format::parse_row_time;
use upload_ledger::ledger::{merge, parse_ledger, ColumnLabels, MergeContext, UploadRecord};

fn record_strategy() -> impl Strategy<Value = UploadRecord> {
    (
        "[a-z]{1,8}\\.(txt|pdf|png)",
        1_500_000_000i64..1_900_000_000i64,
        0u64..50_000_000,
        prop::option::of("[A-Z][a-z]{1,6}"),
        prop::option::of("[A-Z][a-z]{1,6}"),
    )
        .prop_map(|(name, secs, size, uploader, location)| {
            let mut record = UploadRecord::new(name, Utc.timestamp_opt(secs, 0).unwrap())
                .with_size(size);
            if let Some(uploader) = uploader {
                record = record.with_uploader(uploader);
            }
            if let Some(location) = location {
                record = record.with_location(location);
            }
            record
        })
}

fn batch_strategy() -> impl Strategy<Value = Vec<UploadRecord>> {
    prop::collection::vec(record_strategy(), 1..8)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

fn rows(text: &str) -> Vec<String> {
    parse_ledger(text, &ColumnLabels::default()).document.rows
}

/// Rows come out newest first no matter how batches arrive.
#[test]
fn test_rows_sorted_descending_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(batch_strategy(), batch_strategy()), |(first, second)| {
            let ctx = MergeContext::new(now());
            let once = merge(None, &first, &ctx).unwrap();
            let twice = merge(Some(&once), &second, &ctx).unwrap();

            let times: Vec<_> = rows(&twice)
                .iter()
                .map(|row| parse_row_time(row).unwrap())
                .collect();
            prop_assert!(times.windows(2).all(|pair| pair[0] >= pair[1]));
            Ok(())
        })
        .unwrap();
}

/// Merging the same batch again changes nothing.
#[test]
fn test_remerge_idempotent_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&batch_strategy(), |batch| {
            let ctx = MergeContext::new(now());
            let once = merge(None, &batch, &ctx).unwrap();
            let twice = merge(Some(&once), &batch, &ctx).unwrap();
            prop_assert_eq!(once, twice);
            Ok(())
        })
        .unwrap();
}

/// No existing row is ever lost, and row count grows by at most the batch size.
#[test]
fn test_rows_never_lost_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(batch_strategy(), batch_strategy()), |(first, second)| {
            let ctx = MergeContext::new(now());
            let before = merge(None, &first, &ctx).unwrap();
            let after = merge(Some(&before), &second, &ctx).unwrap();

            let before_rows = rows(&before);
            let after_rows = rows(&after);
            for row in &before_rows {
                prop_assert!(after_rows.contains(row));
            }
            prop_assert!(after_rows.len() <= before_rows.len() + second.len());
            Ok(())
        })
        .unwrap();
}

/// Front matter fields other than `lastmod` pass through untouched.
#[test]
fn test_front_matter_preserved_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let fields = prop::collection::btree_map("[a-z][a-z_]{0,10}", "[A-Za-z0-9 ,.']{0,20}", 0..6);

    runner
        .run(&(fields, batch_strategy()), |(fields, batch)| {
            let mut existing = String::from("---\n");
            for (key, value) in &fields {
                existing.push_str(&format!("{}: {}\n", key, value));
            }
            existing.push_str("---\n");

            let text = merge(Some(&existing), &batch, &MergeContext::new(now())).unwrap();
            let front_matter = parse_ledger(&text, &ColumnLabels::default())
                .document
                .front_matter
                .unwrap();
            for (key, value) in &fields {
                if key != "lastmod" {
                    prop_assert_eq!(front_matter.get(key), Some(value.trim()));
                }
            }
            prop_assert_eq!(front_matter.get("lastmod"), Some("2030-01-01 00:00:00"));
            Ok(())
        })
        .unwrap();
}
