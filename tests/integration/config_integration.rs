//! Integration tests for configuration loading

use std::sync::Mutex;
use tempfile::TempDir;
use upload_ledger::config::{ConfigLoader, ValidationError};
use upload_ledger::ledger::Column;

// Serializes tests that touch process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const FULL_CONFIG: &str = r#"
[storage]
owner = "octo"
repo = "files"
branch = "uploads"
token = "t0ken"

[ledger]
directory = "content/post"
file_name = "records.md"
title = "Team Files"
columns = ["file_name", "upload_time", "uploader", "download_link"]
display_offset_minutes = 480
history_path = "log/uploadlog.json"

[ledger.labels]
uploader = "Uploaded By"

[ledger.repository]
owner = "octo"
repo = "blog"
token = "other"

[upload]
password = "secret"

[logging]
level = "info"
format = "json"
"#;

#[test]
fn test_load_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, FULL_CONFIG).unwrap();

    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        ConfigLoader::load_from_file(&config_file).unwrap()
    };
    assert!(config.validate().is_ok());

    assert_eq!(config.storage.branch, "uploads");
    assert_eq!(config.storage.directory, "src/upload/assets");
    assert_eq!(config.ledger.path(), "content/post/records.md");
    assert_eq!(
        config.ledger.columns,
        vec![
            Column::FileName,
            Column::UploadTime,
            Column::Uploader,
            Column::DownloadLink
        ]
    );
    assert_eq!(config.ledger.labels.uploader, "Uploaded By");
    assert_eq!(config.ledger.labels.file_name, "File Name");
    assert_eq!(config.ledger.max_attempts, 3);
    assert_eq!(config.upload.password(), Some("secret"));
    assert_eq!(config.logging.format, "json");

    let ledger_repo = config.ledger_repository();
    assert_eq!(ledger_repo.repo, "blog");
    assert_eq!(ledger_repo.branch, "main");
}

#[test]
fn test_ledger_repository_defaults_to_storage() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, "[storage]\nowner = \"octo\"\nrepo = \"files\"\n").unwrap();

    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        ConfigLoader::load_from_file(&config_file).unwrap()
    };
    let repo = config.ledger_repository();
    assert_eq!(repo.owner, "octo");
    assert_eq!(repo.repo, "files");
    assert!(config.upload.password().is_none());
}

#[test]
fn test_environment_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(&config_file, "[storage]\nowner = \"octo\"\nrepo = \"files\"\n").unwrap();

    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("UPLOAD_LEDGER__STORAGE__OWNER", "from-env");
        std::env::set_var("UPLOAD_LEDGER__LEDGER__MAX_ATTEMPTS", "7");
        let loaded = ConfigLoader::load_from_file(&config_file);
        std::env::remove_var("UPLOAD_LEDGER__STORAGE__OWNER");
        std::env::remove_var("UPLOAD_LEDGER__LEDGER__MAX_ATTEMPTS");
        loaded.unwrap()
    };
    assert_eq!(config.storage.owner, "from-env");
    assert_eq!(config.storage.repo, "files");
    assert_eq!(config.ledger.max_attempts, 7);
}

#[test]
fn test_validation_collects_every_problem() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_file,
        "[ledger]\nmax_attempts = 0\n\n[logging]\nlevel = \"loud\"\n",
    )
    .unwrap();

    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        ConfigLoader::load_from_file(&config_file).unwrap()
    };
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], ValidationError::Storage(_)));
    assert!(matches!(errors[1], ValidationError::Ledger(_)));
    assert!(matches!(errors[2], ValidationError::Logging(_)));
}
