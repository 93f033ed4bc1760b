//! Merge rules: defaults, override order, conflict handling.

use crate::config::{
    DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_LEDGER_DIRECTORY, DEFAULT_LEDGER_FILE,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_UPLOAD_DIRECTORY,
};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Prefix of environment overrides: `UPLOAD_LEDGER__STORAGE__TOKEN` sets `storage.token`.
pub const ENV_PREFIX: &str = "UPLOAD_LEDGER";
pub const ENV_SEPARATOR: &str = "__";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.branch", DEFAULT_BRANCH)?
        .set_default("storage.api_base", DEFAULT_API_BASE)?
        .set_default("storage.directory", DEFAULT_UPLOAD_DIRECTORY)?
        .set_default("ledger.directory", DEFAULT_LEDGER_DIRECTORY)?
        .set_default("ledger.file_name", DEFAULT_LEDGER_FILE)?
        .set_default("ledger.max_attempts", i64::from(DEFAULT_MAX_ATTEMPTS))?
        .set_default("ledger.display_offset_minutes", 0i64)
}

/// Environment variables override every file source.
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
