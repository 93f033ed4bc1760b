//! Configuration System
//!
//! Layered configuration for the uploader: where uploaded files and the ledger
//! live, how the ledger is rendered, the upload password, and logging.
//! Built once per process by [`ConfigLoader`] and passed down explicitly.

use crate::error::ApiError;
use crate::ledger::{Column, ColumnLabels, DocumentTemplate, MergeContext};
use crate::logging::LoggingConfig;
use crate::store::join_path;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_UPLOAD_DIRECTORY: &str = "src/upload/assets";
pub const DEFAULT_LEDGER_DIRECTORY: &str = "content/post";
pub const DEFAULT_LEDGER_FILE: &str = "upload-records.md";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Largest accepted display offset, in minutes either side of UTC.
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Repository and directory receiving uploaded files
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ledger document location and rendering
    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A GitHub repository branch used as a document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Access token; may also come from `UPLOAD_LEDGER__STORAGE__TOKEN`.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl RepositoryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.owner.trim().is_empty() {
            return Err("owner cannot be empty".to_string());
        }
        if self.repo.trim().is_empty() {
            return Err("repo cannot be empty".to_string());
        }
        if self.branch.trim().is_empty() {
            return Err("branch cannot be empty".to_string());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!("api_base must be an http(s) URL: {}", self.api_base));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Directory uploaded files are written to
    #[serde(default = "default_upload_directory")]
    pub directory: String,
}

fn default_upload_directory() -> String {
    DEFAULT_UPLOAD_DIRECTORY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token: String::new(),
            api_base: default_api_base(),
            directory: default_upload_directory(),
        }
    }
}

impl StorageConfig {
    pub fn repository(&self) -> RepositoryConfig {
        RepositoryConfig {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            token: self.token.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Separate repository for the ledger; defaults to the storage repository
    #[serde(default)]
    pub repository: Option<RepositoryConfig>,

    #[serde(default = "default_ledger_directory")]
    pub directory: String,

    #[serde(default = "default_ledger_file")]
    pub file_name: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_image")]
    pub image: String,

    /// Columns a ledger table should carry; the mandatory ones are always present
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub labels: ColumnLabels,

    /// Offset from UTC used to render upload times and `lastmod`
    #[serde(default)]
    pub display_offset_minutes: i32,

    /// Optional JSON upload history document, relative to the ledger repository root
    #[serde(default)]
    pub history_path: Option<String>,

    /// Read-merge-write cycles attempted before giving up on conflicts
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_ledger_directory() -> String {
    DEFAULT_LEDGER_DIRECTORY.to_string()
}

fn default_ledger_file() -> String {
    DEFAULT_LEDGER_FILE.to_string()
}

fn default_title() -> String {
    DocumentTemplate::default().title
}

fn default_description() -> String {
    DocumentTemplate::default().description
}

fn default_category() -> String {
    DocumentTemplate::default().category
}

fn default_image() -> String {
    DocumentTemplate::default().image
}

fn default_columns() -> Vec<Column> {
    Column::CANONICAL.to_vec()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            repository: None,
            directory: default_ledger_directory(),
            file_name: default_ledger_file(),
            title: default_title(),
            description: default_description(),
            category: default_category(),
            image: default_image(),
            columns: default_columns(),
            labels: ColumnLabels::default(),
            display_offset_minutes: 0,
            history_path: None,
            max_attempts: default_max_attempts(),
        }
    }
}

impl LedgerConfig {
    /// Store path of the ledger document.
    pub fn path(&self) -> String {
        join_path(&self.directory, &self.file_name)
    }

    pub fn template(&self) -> DocumentTemplate {
        DocumentTemplate {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            image: self.image.clone(),
        }
    }

    pub fn display_offset(&self) -> Result<FixedOffset, ApiError> {
        self.display_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "display_offset_minutes out of range: {}",
                    self.display_offset_minutes
                ))
            })
    }

    /// Merge settings for a run at `now`.
    pub fn merge_context(&self, now: DateTime<Utc>) -> Result<MergeContext, ApiError> {
        Ok(MergeContext::new(now)
            .with_offset(self.display_offset()?)
            .with_columns(self.columns.clone())
            .with_labels(self.labels.clone())
            .with_template(self.template()))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("file_name cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.display_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(format!(
                "display_offset_minutes must be within ±{}",
                MAX_OFFSET_MINUTES
            ));
        }
        if let Some(history) = &self.history_path {
            if history.trim().is_empty() {
                return Err("history_path cannot be empty when set".to_string());
            }
        }
        self.labels.validate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Shared upload password; empty disables the check
    #[serde(default)]
    pub password: String,
}

impl UploadConfig {
    pub fn password(&self) -> Option<&str> {
        Some(self.password.as_str()).filter(|p| !p.is_empty())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Storage(String),
    Ledger(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Ledger(msg) => write!(f, "Ledger: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl UploaderConfig {
    /// Repository holding the ledger document.
    pub fn ledger_repository(&self) -> RepositoryConfig {
        self.ledger
            .repository
            .clone()
            .unwrap_or_else(|| self.storage.repository())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.storage.repository().validate() {
            errors.push(ValidationError::Storage(e));
        }

        if let Some(repository) = &self.ledger.repository {
            if let Err(e) = repository.validate() {
                errors.push(ValidationError::Ledger(format!("repository {}", e)));
            }
        }

        if let Err(e) = self.ledger.validate() {
            errors.push(ValidationError::Ledger(e));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`Self::validate`] folded into a single error for callers that stop on failure.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
