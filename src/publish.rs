//! Ledger publishing: fetch, merge, conditional write, retry on conflict.
//!
//! The store offers no locking. Every cycle re-reads the ledger and writes
//! against the version it read, so a concurrent writer costs one more cycle
//! instead of a lost row.

use crate::config::LedgerConfig;
use crate::error::{ApiError, StoreError};
use crate::ledger::{merge_detailed, DegradeReason, UploadRecord};
use crate::store::{DocumentStore, PutReceipt, VersionTag};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub path: String,
    pub version: VersionTag,
    /// Read-merge-write cycles used, including the successful one.
    pub attempts: u32,
    /// Whether the ledger document did not exist before.
    pub created: bool,
    pub added: usize,
    pub total_rows: usize,
    pub degraded: Vec<DegradeReason>,
    /// Whether the history entry was appended. Always false without a history path.
    pub history_recorded: bool,
}

/// One entry of the upload history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub files: Vec<String>,
    pub total_files: usize,
}

pub struct LedgerPublisher {
    store: Arc<dyn DocumentStore>,
    ledger: LedgerConfig,
}

impl LedgerPublisher {
    pub fn new(store: Arc<dyn DocumentStore>, ledger: LedgerConfig) -> Self {
        Self { store, ledger }
    }

    pub fn ledger_path(&self) -> String {
        self.ledger.path()
    }

    /// Publish records with the current time as `lastmod`.
    pub async fn publish(&self, records: &[UploadRecord]) -> Result<PublishReport, ApiError> {
        self.publish_at(records, Utc::now()).await
    }

    #[instrument(skip(self, records), fields(records = records.len(), path = %self.ledger.path()))]
    pub async fn publish_at(
        &self,
        records: &[UploadRecord],
        now: DateTime<Utc>,
    ) -> Result<PublishReport, ApiError> {
        let ctx = self.ledger.merge_context(now)?;
        let path = self.ledger.path();
        let message = commit_message(records);

        let mut created = false;
        let mut degraded = Vec::new();
        let mut total_rows = 0;
        let (receipt, attempts) = self
            .read_modify_write(&path, &message, |existing| {
                let outcome = merge_detailed(existing, records, &ctx)?;
                created = existing.is_none();
                degraded = outcome.degraded;
                total_rows = outcome.total_rows;
                Ok(outcome.text)
            })
            .await?;

        info!(
            attempts,
            total_rows,
            created,
            version = %receipt.version,
            "Published ledger"
        );

        let history_recorded = match &self.ledger.history_path {
            Some(history_path) => match self.append_history(history_path, records, now).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(history_path = %history_path, error = %e, "Failed to append upload history");
                    false
                }
            },
            None => false,
        };

        Ok(PublishReport {
            path,
            version: receipt.version,
            attempts,
            created,
            added: records.len(),
            total_rows,
            degraded,
            history_recorded,
        })
    }

    async fn append_history(
        &self,
        history_path: &str,
        records: &[UploadRecord],
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let entry = HistoryEntry {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            files: records.iter().map(|r| r.file_name.clone()).collect(),
            total_files: records.len(),
        };
        let message = format!("Record upload history: {} files", records.len());
        self.read_modify_write(history_path, &message, |existing| {
            append_history_entry(existing, &entry)
        })
        .await
        .map(|_| ())
    }

    /// Fetch `path`, build the new content, write it against the fetched
    /// version. Conflicts restart the cycle up to `max_attempts` times.
    async fn read_modify_write<F>(
        &self,
        path: &str,
        message: &str,
        mut build: F,
    ) -> Result<(PutReceipt, u32), ApiError>
    where
        F: FnMut(Option<&str>) -> Result<String, ApiError> + Send,
    {
        let max_attempts = self.ledger.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let current = self.store.fetch(path).await?;
            let (text, version) = match current {
                Some(doc) => (Some(doc.text()?), Some(doc.version)),
                None => (None, None),
            };
            let content = build(text.as_deref())?;

            match self
                .store
                .put(path, content.as_bytes(), version.as_ref(), message)
                .await
            {
                Ok(receipt) => return Ok((receipt, attempt)),
                Err(e) if e.is_conflict() => {
                    warn!(
                        attempt,
                        max_attempts,
                        store = self.store.store_name(),
                        path,
                        "Document changed while merging; retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::ConflictRetriesExhausted {
            path: path.to_string(),
            attempts: max_attempts,
        })
    }
}

/// `Update upload ledger: added <n> files by <uploader>`.
pub fn commit_message(records: &[UploadRecord]) -> String {
    let mut uploaders: Vec<&str> = Vec::new();
    for record in records {
        let name = record.uploader_name.trim();
        if !name.is_empty() && !uploaders.contains(&name) {
            uploaders.push(name);
        }
    }
    let by = if uploaders.is_empty() {
        "unknown uploader".to_string()
    } else {
        uploaders.join(", ")
    };
    format!("Update upload ledger: added {} files by {}", records.len(), by)
}

/// Append to a JSON array document. Content that is not such an array is an
/// error rather than something to overwrite.
fn append_history_entry(existing: Option<&str>, entry: &HistoryEntry) -> Result<String, ApiError> {
    let mut entries: Vec<serde_json::Value> = match existing.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(text) => serde_json::from_str(text).map_err(|e| {
            StoreError::InvalidResponse(format!("history document is not a JSON array: {}", e))
        })?,
    };
    let value = serde_json::to_value(entry)
        .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode history: {}", e)))?;
    entries.push(value);
    debug!(entries = entries.len(), "Appending upload history");
    serde_json::to_string_pretty(&entries)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|e| StoreError::InvalidResponse(format!("Failed to encode history: {}", e)).into())
}
