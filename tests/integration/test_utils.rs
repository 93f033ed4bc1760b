//! Shared helpers for integration tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use upload_ledger::error::StoreError;
use upload_ledger::store::{DocumentStore, MemoryStore, PutReceipt, StoredDocument, VersionTag};

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A store whose every call fails as if the service were down.
pub struct DownStore;

#[async_trait]
impl DocumentStore for DownStore {
    async fn fetch(&self, _path: &str) -> Result<Option<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable("service down".to_string()))
    }

    async fn put(
        &self,
        _path: &str,
        _content: &[u8],
        _version: Option<&VersionTag>,
        _message: &str,
    ) -> Result<PutReceipt, StoreError> {
        Err(StoreError::Unavailable("service down".to_string()))
    }

    async fn list_names(&self, _dir: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("service down".to_string()))
    }

    fn store_name(&self) -> &str {
        "down"
    }
}

/// Wraps a [`MemoryStore`] and misbehaves on demand.
///
/// `conflicts` puts on matching paths fail with a conflict before reaching the
/// inner store. Before each of those failures `interleave` (if set) is written
/// to the inner store, standing in for another writer. Names in `broken` fail
/// every put with `Unavailable`.
pub struct FlakyStore {
    pub inner: MemoryStore,
    conflicts: AtomicUsize,
    conflict_path: String,
    interleave: Mutex<Vec<(String, String)>>,
    broken: Vec<String>,
    pub puts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            conflicts: AtomicUsize::new(0),
            conflict_path: String::new(),
            interleave: Mutex::new(Vec::new()),
            broken: Vec::new(),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn with_conflicts(mut self, path: &str, count: usize) -> Self {
        self.conflict_path = path.to_string();
        self.conflicts = AtomicUsize::new(count);
        self
    }

    /// Content another writer stores at `path` when the next conflict fires.
    pub fn with_interleaved_write(self, path: &str, content: &str) -> Self {
        self.interleave
            .lock()
            .push((path.to_string(), content.to_string()));
        self
    }

    pub fn with_broken_name(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn fetch(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.inner.fetch(path).await
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        version: Option<&VersionTag>,
        message: &str,
    ) -> Result<PutReceipt, StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.broken.iter().any(|name| path.ends_with(name.as_str())) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        if path == self.conflict_path
            && self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            let pending = self.interleave.lock().pop();
            if let Some((other_path, other_content)) = pending {
                self.inner.insert(&other_path, other_content);
            }
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }
        self.inner.put(path, content, version, message).await
    }

    async fn list_names(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        self.inner.list_names(dir).await
    }

    fn store_name(&self) -> &str {
        "flaky"
    }
}
