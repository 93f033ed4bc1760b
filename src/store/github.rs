//! GitHub Contents API store.
//!
//! One repository branch is the document store: paths are repository paths,
//! version tags are blob shas, and every write is a commit.

use crate::config::RepositoryConfig;
use crate::error::StoreError;
use crate::store::{DocumentStore, PutReceipt, StoredDocument, VersionTag};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("upload-ledger/", env!("CARGO_PKG_VERSION"));

/// Which call produced a status; conflicts only exist for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Fetch,
    Put,
    List,
}

pub struct GitHubContentsStore {
    client: Client,
    repository: RepositoryConfig,
    name: String,
}

impl GitHubContentsStore {
    pub fn new(repository: RepositoryConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;
        let name = format!("github:{}/{}@{}", repository.owner, repository.repo, repository.branch);
        Ok(Self {
            client,
            repository,
            name,
        })
    }

    fn url(&self, path: &str) -> Result<Url, StoreError> {
        contents_url(
            &self.repository.api_base,
            &self.repository.owner,
            &self.repository.repo,
            path,
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Accept", ACCEPT);
        if self.repository.token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("token {}", self.repository.token))
        }
    }
}

#[derive(Deserialize)]
struct ContentsFile {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct ContentsEntry {
    name: String,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Deserialize)]
struct PutContent {
    sha: String,
    #[serde(default)]
    download_url: Option<String>,
}

#[async_trait]
impl DocumentStore for GitHubContentsStore {
    #[instrument(skip(self), fields(store = %self.name))]
    async fn fetch(&self, path: &str) -> Result<Option<StoredDocument>, StoreError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.repository.branch);
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Document not found");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(Operation::Fetch, status.as_u16(), path, &body));
        }

        let file: ContentsFile = response.json().await.map_err(|e| {
            StoreError::InvalidResponse(format!("Failed to parse contents of {}: {}", path, e))
        })?;
        let content = decode_content(&file)?;
        debug!(bytes = content.len(), sha = %file.sha, "Fetched document");
        Ok(Some(StoredDocument {
            content,
            version: VersionTag::new(file.sha),
        }))
    }

    #[instrument(skip(self, content, version), fields(store = %self.name, bytes = content.len()))]
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        version: Option<&VersionTag>,
        message: &str,
    ) -> Result<PutReceipt, StoreError> {
        let request = PutRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.repository.branch,
            sha: version.map(VersionTag::as_str),
        };
        let response = self
            .authorized(self.client.put(self.url(path)?))
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(Operation::Put, status.as_u16(), path, &body));
        }

        let written: PutResponse = response.json().await.map_err(|e| {
            StoreError::InvalidResponse(format!("Failed to parse write result for {}: {}", path, e))
        })?;
        debug!(sha = %written.content.sha, "Stored document");
        Ok(PutReceipt {
            version: VersionTag::new(written.content.sha),
            download_url: written.content.download_url,
        })
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn list_names(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let mut url = self.url(dir)?;
        url.query_pairs_mut().append_pair("ref", &self.repository.branch);
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(Operation::List, status.as_u16(), dir, &body));
        }

        let entries: Vec<ContentsEntry> = response.json().await.map_err(|e| {
            StoreError::InvalidResponse(format!("{} is not a directory listing: {}", dir, e))
        })?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }

    fn store_name(&self) -> &str {
        &self.name
    }
}

/// `{api_base}/repos/{owner}/{repo}/contents/{path}` with each path segment escaped.
fn contents_url(api_base: &str, owner: &str, repo: &str, path: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(api_base)
        .map_err(|e| StoreError::Unavailable(format!("Invalid API base URL {}: {}", api_base, e)))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Unavailable(format!("API base URL cannot have a path: {}", api_base)))?
        .pop_if_empty()
        .extend(["repos", owner, repo, "contents"])
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

fn decode_content(file: &ContentsFile) -> Result<Vec<u8>, StoreError> {
    match (file.encoding.as_deref(), file.content.as_deref()) {
        (Some("base64"), Some(content)) => decode_base64(content),
        (encoding, _) => Err(StoreError::InvalidResponse(format!(
            "unsupported content encoding {:?}",
            encoding
        ))),
    }
}

/// Decode base64 that may be wrapped across lines.
fn decode_base64(content: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StoreError::InvalidResponse(format!("Invalid base64 content: {}", e)))
}

fn status_error(operation: Operation, status: u16, path: &str, body: &str) -> StoreError {
    match status {
        401 | 403 => StoreError::Unauthorized(format!("status {} for {}: {}", status, path, body)),
        409 | 422 if operation == Operation::Put => StoreError::Conflict {
            path: path.to_string(),
        },
        _ => StoreError::Unavailable(format!(
            "{:?} {} failed with status {}: {}",
            operation, path, status, body
        )),
    }
}

fn map_http_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::Unavailable(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        StoreError::Unavailable(format!("Connection error: {}", error))
    } else {
        StoreError::Unavailable(format!("HTTP error: {}", error))
    }
}
