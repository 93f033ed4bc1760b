//! Upload transport: password gate, collision-free naming, storage, publish.

use crate::error::{ApiError, LedgerError};
use crate::ledger::UploadRecord;
use crate::publish::{LedgerPublisher, PublishReport};
use crate::store::{join_path, DocumentStore};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A file submitted for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a local file; the upload name is its final path component.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!("{} does not name a file", path.display()))
            })?;
        let content = std::fs::read(path)?;
        Ok(Self { name, content })
    }
}

/// Who is uploading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uploader {
    pub name: String,
    pub location: Option<String>,
}

impl Uploader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub original_name: String,
    pub stored_name: String,
    pub path: String,
    pub size: u64,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub name: String,
    pub error: String,
}

/// Per-file results of a batch, plus the ledger publish when anything was stored.
///
/// A failed publish does not discard the report: the stored files are already
/// in the repository and `publish_error` says why the ledger lacks them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub stored: Vec<StoredFile>,
    pub failed: Vec<FailedFile>,
    pub publish: Option<PublishReport>,
    pub publish_error: Option<String>,
}

impl BatchReport {
    pub fn all_stored(&self) -> bool {
        self.failed.is_empty()
    }

    /// Every stored file is recorded in the ledger.
    pub fn ledger_updated(&self) -> bool {
        self.stored.is_empty() || self.publish.is_some()
    }
}

pub struct UploadService {
    store: Arc<dyn DocumentStore>,
    directory: String,
    password: Option<String>,
    publisher: LedgerPublisher,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        directory: impl Into<String>,
        password: Option<String>,
        publisher: LedgerPublisher,
    ) -> Self {
        Self {
            store,
            directory: directory.into(),
            password: password.filter(|p| !p.is_empty()),
            publisher,
        }
    }

    /// Store every file, then publish ledger rows for the ones that were stored.
    #[instrument(skip(self, files, uploader, password), fields(files = files.len(), uploader = %uploader.name))]
    pub async fn upload_batch(
        &self,
        files: Vec<UploadFile>,
        uploader: &Uploader,
        password: Option<&str>,
    ) -> Result<BatchReport, ApiError> {
        if let Some(expected) = &self.password {
            if password != Some(expected.as_str()) {
                warn!("Upload rejected: wrong password");
                return Err(ApiError::Unauthorized("invalid upload password".to_string()));
            }
        }
        if files.is_empty() {
            return Err(LedgerError::InvalidInput("no files to upload".to_string()).into());
        }

        let mut taken: HashSet<String> = self
            .store
            .list_names(&self.directory)
            .await?
            .into_iter()
            .collect();
        debug!(existing = taken.len(), directory = %self.directory, "Listed upload directory");

        let mut stored = Vec::new();
        let mut failed = Vec::new();
        let mut records = Vec::new();
        for file in files {
            let now = Utc::now();
            let stored_name = unique_file_name(&file.name, &taken, now.timestamp_millis());
            let path = join_path(&self.directory, &stored_name);
            let message = format!("Upload file: {}", stored_name);

            match self.store.put(&path, &file.content, None, &message).await {
                Ok(receipt) => {
                    taken.insert(stored_name.clone());
                    let size = file.content.len() as u64;
                    let mut record = UploadRecord::new(stored_name.clone(), now)
                        .with_size(size)
                        .with_uploader(uploader.name.clone());
                    if let Some(location) = &uploader.location {
                        record = record.with_location(location.clone());
                    }
                    if let Some(url) = &receipt.download_url {
                        record = record.with_download_url(url.clone());
                    }
                    records.push(record);
                    info!(file = %stored_name, size, "Stored upload");
                    stored.push(StoredFile {
                        original_name: file.name,
                        stored_name,
                        path,
                        size,
                        download_url: receipt.download_url,
                    });
                }
                Err(e) => {
                    error!(file = %file.name, error = %e, "Failed to store upload");
                    failed.push(FailedFile {
                        name: file.name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let (publish, publish_error) = if records.is_empty() {
            warn!("No file stored; ledger left unchanged");
            (None, None)
        } else {
            match self.publisher.publish(&records).await {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    error!(
                        stored = records.len(),
                        path = %self.publisher.ledger_path(),
                        error = %e,
                        "Files stored but ledger update failed"
                    );
                    (None, Some(e.to_string()))
                }
            }
        };

        Ok(BatchReport {
            stored,
            failed,
            publish,
            publish_error,
        })
    }
}

/// `name` if free, else `<stem>_<millis>.<ext>`, bumping `millis` until free.
/// Directory components in `name` are dropped.
pub fn unique_file_name(name: &str, taken: &HashSet<String>, millis: i64) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or("upload");
    if !taken.contains(base) {
        return base.to_string();
    }
    let (stem, ext) = match base.rfind('.') {
        Some(dot) if dot > 0 => (&base[..dot], Some(&base[dot + 1..])),
        _ => (base, None),
    };
    let mut stamp = millis;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}_{}.{}", stem, stamp, ext),
            None => format!("{}_{}", stem, stamp),
        };
        if !taken.contains(&candidate) {
            return candidate;
        }
        stamp += 1;
    }
}
