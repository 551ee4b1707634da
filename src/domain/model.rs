use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AppError;

/// Body of a message on the `download` channel: `{ "payload": { ... } }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DownloadCommand {
    pub payload: DownloadRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DownloadRequest {
    // Kept optional on the wire so a missing url is reported as such
    // instead of as a generic decode error.
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<DownloadProperties>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            properties: None,
        }
    }
}

/// Transfer options. Keys other than the ones named here are carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DownloadProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DownloadProperties {
    /// Merges the location picked in the save dialog into the options.
    pub fn with_save_path(mut self, directory: PathBuf, filename: String) -> Self {
        self.directory = Some(directory);
        self.file_name = Some(filename.clone());
        self.filename = Some(filename);
        self
    }

    pub fn target_path(&self) -> Option<PathBuf> {
        let filename = self.filename.as_deref().or(self.file_name.as_deref())?;
        let directory = self.directory.as_deref().unwrap_or_else(|| Path::new("."));
        Some(directory.join(filename))
    }
}

/// Payload of `download-progress`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    pub percent: f64,
    #[serde(default)]
    pub transferred_bytes: u64,
    #[serde(default)]
    pub total_bytes: u64,
}

impl ProgressInfo {
    pub fn new(transferred_bytes: u64, total_bytes: Option<u64>) -> Self {
        let total = total_bytes.unwrap_or(0);
        let percent = if total > 0 {
            (transferred_bytes as f64 / total as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            percent,
            transferred_bytes,
            total_bytes: total,
        }
    }
}

/// Payload of `download-complete`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    pub path: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    InvalidRequest,
    Busy,
    Transfer,
}

/// Payload of `download-error`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DownloadFailure {
    pub reason: String,
    pub kind: FailureKind,
}

impl From<&AppError> for DownloadFailure {
    fn from(error: &AppError) -> Self {
        Self {
            reason: error.to_string(),
            kind: error.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPhase {
    Idle,
    /// Percent in `0.0..=100.0`.
    Downloading(f64),
    Completed(String),
    Failed(String),
}
