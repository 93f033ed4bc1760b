//! In-process document store.

use crate::error::StoreError;
use crate::store::{DocumentStore, PutReceipt, StoredDocument, VersionTag};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Thread-safe map store. The version tag of a document is the blake3 digest
/// of its content, so rewriting identical bytes keeps the tag.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without any version check.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .insert(normalize(path), content.into());
    }

    /// Current content at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.documents.read().get(&normalize(path)).cloned()
    }

    /// Current content at `path` as text. Non-UTF-8 content reads as `None`.
    pub fn get_text(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn paths(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }

    pub fn version_of(content: &[u8]) -> VersionTag {
        VersionTag::new(blake3::hash(content).to_hex().to_string())
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self
            .documents
            .read()
            .get(&normalize(path))
            .map(|content| StoredDocument {
                content: content.clone(),
                version: Self::version_of(content),
            }))
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        version: Option<&VersionTag>,
        _message: &str,
    ) -> Result<PutReceipt, StoreError> {
        let key = normalize(path);
        let mut documents = self.documents.write();
        let current = documents.get(&key).map(|c| Self::version_of(c));
        if current.as_ref() != version {
            return Err(StoreError::Conflict { path: key });
        }
        documents.insert(key.clone(), content.to_vec());
        Ok(PutReceipt {
            version: Self::version_of(content),
            download_url: Some(format!("memory://{}", key)),
        })
    }

    async fn list_names(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let dir = normalize(dir);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        let mut names: Vec<String> = self
            .documents
            .read()
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        names.dedup();
        Ok(names)
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
