//! The compiled binary, driven as a user would.

use std::process::Command;
use tempfile::TempDir;

const RECORDS: &str = r#"[
  {"file_name": "a.txt", "upload_time": "2024-01-01T00:00:00Z", "file_size_bytes": 100, "uploader_name": "Bob"},
  {"file_name": "b.txt", "upload_time": 1704153600000, "file_size_bytes": 2048, "uploader_name": "Ann", "uploader_location": "Oslo"}
]"#;

fn binary(temp: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_upload-ledger"));
    command
        .arg("--workspace")
        .arg(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .env_remove("UPLOAD_LEDGER_LOG")
        .env_remove("UPLOAD_LEDGER__STORAGE__OWNER")
        .env_remove("UPLOAD_LEDGER__LEDGER__MAX_ATTEMPTS");
    command
}

#[test]
fn test_merge_to_stdout() {
    let temp = TempDir::new().unwrap();
    let records = temp.path().join("records.json");
    std::fs::write(&records, RECORDS).unwrap();

    let output = binary(&temp)
        .args(["merge", "--stdout", "--ledger"])
        .arg(temp.path().join("ledger.md"))
        .arg("--records")
        .arg(&records)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("---\ntitle: Upload Records\n"));
    let b = stdout
        .find("| b.txt | 2024-01-02 00:00:00 | 2 KB | Ann | Oslo | no link |")
        .unwrap();
    let a = stdout
        .find("| a.txt | 2024-01-01 00:00:00 | 100 Bytes | Bob | unknown | no link |")
        .unwrap();
    assert!(b < a);
    assert!(stdout.ends_with("| no link |\n"));
    assert!(!stdout.ends_with("\n\n"));
    assert!(!temp.path().join("ledger.md").exists());
}

#[test]
fn test_merge_writes_then_stats_reads() {
    let temp = TempDir::new().unwrap();
    let records = temp.path().join("records.json");
    let ledger = temp.path().join("out").join("ledger.md");
    std::fs::write(&records, RECORDS).unwrap();

    let merged = binary(&temp)
        .arg("merge")
        .arg("--ledger")
        .arg(&ledger)
        .arg("--records")
        .arg(&records)
        .output()
        .unwrap();
    assert!(merged.status.success());
    assert!(ledger.exists());

    let stats = binary(&temp)
        .args(["stats", "--format", "json", "--ledger"])
        .arg(&ledger)
        .output()
        .unwrap();
    assert!(stats.status.success());
    let value: serde_json::Value = serde_json::from_slice(&stats.stdout).unwrap();
    assert_eq!(value["total_files"], 2);
    assert_eq!(value["unique_uploaders"], 2);
}

#[test]
fn test_validate_fails_without_repository() {
    let temp = TempDir::new().unwrap();
    let output = binary(&temp).arg("validate").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("owner cannot be empty"));
}

#[test]
fn test_validate_accepts_workspace_config() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("config")).unwrap();
    std::fs::write(
        temp.path().join("config").join("config.toml"),
        "[storage]\nowner = \"octo\"\nrepo = \"files\"\n",
    )
    .unwrap();

    let output = binary(&temp).arg("validate").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("Configuration is valid."));
}
