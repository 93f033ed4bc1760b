//! Upload records: the merger's input.

use crate::error::LedgerError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Location rendered when an upload carries none.
pub const DEFAULT_LOCATION: &str = "unknown";

/// Epoch values at or above this magnitude are read as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Metadata for one file that has already been durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub file_name: String,
    #[serde(deserialize_with = "deserialize_upload_time")]
    pub upload_time: DateTime<Utc>,
    #[serde(default)]
    pub file_size_bytes: u64,
    #[serde(default)]
    pub uploader_name: String,
    #[serde(default)]
    pub uploader_location: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl UploadRecord {
    pub fn new(file_name: impl Into<String>, upload_time: DateTime<Utc>) -> Self {
        Self {
            file_name: file_name.into(),
            upload_time,
            file_size_bytes: 0,
            uploader_name: String::new(),
            uploader_location: None,
            download_url: None,
        }
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.file_size_bytes = bytes;
        self
    }

    pub fn with_uploader(mut self, name: impl Into<String>) -> Self {
        self.uploader_name = name.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.uploader_location = Some(location.into());
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// Location to render, falling back to [`DEFAULT_LOCATION`].
    pub fn location(&self) -> &str {
        self.uploader_location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.file_name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "record has an empty file name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an upload time given as ISO-8601 / RFC 3339 text, `YYYY-MM-DD HH:MM:SS`
/// (read as UTC) or a decimal epoch value.
pub fn parse_upload_time(raw: &str) -> Result<DateTime<Utc>, LedgerError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(epoch) = raw.parse::<i64>() {
        return epoch_to_datetime(epoch);
    }
    Err(LedgerError::InvalidInput(format!(
        "unrecognized upload time: {:?}",
        raw
    )))
}

/// Convert an epoch value (seconds or milliseconds) to a UTC timestamp.
pub fn epoch_to_datetime(epoch: i64) -> Result<DateTime<Utc>, LedgerError> {
    let converted = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    };
    converted.ok_or_else(|| LedgerError::InvalidInput(format!("epoch out of range: {}", epoch)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUploadTime {
    Epoch(i64),
    Text(String),
}

fn deserialize_upload_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawUploadTime::deserialize(deserializer)? {
        RawUploadTime::Epoch(epoch) => epoch_to_datetime(epoch),
        RawUploadTime::Text(text) => parse_upload_time(&text),
    };
    parsed.map_err(serde::de::Error::custom)
}
