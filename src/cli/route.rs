//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::config::{ConfigLoader, UploaderConfig};
use crate::error::{ApiError, LedgerError};
use crate::ledger::{merge_detailed, UploadRecord};
use crate::publish::LedgerPublisher;
use crate::report::{parse_entries, search, statistics};
use crate::store::{DocumentStore, GitHubContentsStore};
use crate::upload::{UploadFile, UploadService, Uploader};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cli::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_batch_report, format_merge_summary, format_search_json, format_search_text,
    format_statistics_json, format_statistics_text, format_validation_errors,
};

/// Runtime context for CLI execution: workspace and loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: UploaderConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: UploaderConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            workspace = %self.workspace_root.display(),
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Upload {
                files,
                uploader,
                location,
                password,
            } => self.handle_upload(files, uploader, location.as_deref(), password.as_deref()),
            Commands::Merge {
                ledger,
                records,
                stdout,
            } => self.handle_merge(ledger, records, *stdout),
            Commands::Search {
                query,
                page,
                per_page,
                ledger,
                format,
            } => {
                let text = self.read_ledger(ledger.as_deref())?;
                let entries = parse_entries(&text, &self.config.ledger.labels);
                let page = search(&entries, query.as_deref().unwrap_or(""), *page, *per_page);
                if format == "json" {
                    format_search_json(&page)
                } else {
                    Ok(format_search_text(&page))
                }
            }
            Commands::Stats { ledger, format } => {
                let text = self.read_ledger(ledger.as_deref())?;
                let entries = parse_entries(&text, &self.config.ledger.labels);
                let stats = statistics(&entries);
                if format == "json" {
                    format_statistics_json(&stats)
                } else {
                    Ok(format_statistics_text(&stats))
                }
            }
            Commands::Validate => match self.config.validate() {
                Ok(()) => Ok("Configuration is valid.".to_string()),
                Err(errors) => Err(ApiError::ConfigError(format_validation_errors(&errors))),
            },
        }
    }

    fn handle_upload(
        &self,
        paths: &[PathBuf],
        uploader: &str,
        location: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, ApiError> {
        self.config.ensure_valid()?;
        let files = paths
            .iter()
            .map(|path| UploadFile::from_path(path))
            .collect::<Result<Vec<_>, _>>()?;

        let mut identity = Uploader::new(uploader);
        if let Some(location) = location {
            identity = identity.with_location(location);
        }

        let files_store: Arc<dyn DocumentStore> =
            Arc::new(GitHubContentsStore::new(self.config.storage.repository())?);
        let publisher = LedgerPublisher::new(self.ledger_store()?, self.config.ledger.clone());
        let service = UploadService::new(
            files_store,
            self.config.storage.directory.clone(),
            self.config.upload.password().map(str::to_string),
            publisher,
        );

        let rt = runtime()?;
        let report = rt.block_on(service.upload_batch(files, &identity, password))?;
        info!(
            stored = report.stored.len(),
            failed = report.failed.len(),
            "Upload batch finished"
        );
        Ok(format_batch_report(&report))
    }

    fn handle_merge(
        &self,
        ledger: &Path,
        records_path: &Path,
        to_stdout: bool,
    ) -> Result<String, ApiError> {
        let records_json = std::fs::read_to_string(records_path)?;
        let records: Vec<UploadRecord> = serde_json::from_str(&records_json).map_err(|e| {
            LedgerError::InvalidInput(format!(
                "invalid records file {}: {}",
                records_path.display(),
                e
            ))
        })?;

        let existing = if ledger.exists() {
            Some(std::fs::read_to_string(ledger)?)
        } else {
            None
        };
        let ctx = self.config.ledger.merge_context(Utc::now())?;
        let outcome = merge_detailed(existing.as_deref(), &records, &ctx)?;

        if to_stdout {
            return Ok(outcome.text);
        }
        if let Some(parent) = ledger.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(ledger, &outcome.text)?;
        Ok(format_merge_summary(&ledger.display().to_string(), &outcome))
    }

    /// Ledger text from a local file, or from the configured store.
    /// A ledger that does not exist yet reads as empty.
    fn read_ledger(&self, local: Option<&Path>) -> Result<String, ApiError> {
        if let Some(path) = local {
            return Ok(std::fs::read_to_string(path)?);
        }
        let store = self.ledger_store()?;
        let path = self.config.ledger.path();
        let rt = runtime()?;
        match rt.block_on(store.fetch(&path))? {
            Some(document) => Ok(document.text()?),
            None => Ok(String::new()),
        }
    }

    fn ledger_store(&self) -> Result<Arc<dyn DocumentStore>, ApiError> {
        let repository = self.config.ledger_repository();
        repository
            .validate()
            .map_err(|e| ApiError::ConfigError(format!("Ledger repository {}", e)))?;
        Ok(Arc::new(GitHubContentsStore::new(repository)?))
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    tokio::runtime::Runtime::new().map_err(ApiError::Io)
}
