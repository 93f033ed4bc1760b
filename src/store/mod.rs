//! Document Store
//!
//! Versioned path -> bytes storage behind the ledger and the uploaded files.
//! Every write can be conditioned on the version tag returned by the read it
//! was derived from, which is what the publisher's read-modify-write cycle
//! relies on.

pub mod github;
pub mod memory;

pub use github::GitHubContentsStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;
use std::fmt;

/// Opaque revision identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub content: Vec<u8>,
    pub version: VersionTag,
}

impl StoredDocument {
    /// Content as UTF-8 text.
    pub fn text(&self) -> Result<String, StoreError> {
        String::from_utf8(self.content.clone())
            .map_err(|e| StoreError::InvalidResponse(format!("document is not UTF-8: {}", e)))
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    pub version: VersionTag,
    /// Public URL of the stored bytes, when the store exposes one.
    pub download_url: Option<String>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document. `Ok(None)` when nothing is stored at `path`.
    async fn fetch(&self, path: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Write a document.
    ///
    /// `version: None` creates the document and fails with
    /// [`StoreError::Conflict`] if it already exists. `Some(tag)` replaces it
    /// only while `tag` is still the current version.
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        version: Option<&VersionTag>,
        message: &str,
    ) -> Result<PutReceipt, StoreError>;

    /// Names of the entries directly under `dir`. Empty when `dir` does not exist.
    async fn list_names(&self, dir: &str) -> Result<Vec<String>, StoreError>;

    /// Short name used in logs.
    fn store_name(&self) -> &str;
}

/// Join a directory and a name into a store path. An empty directory yields the name.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
