use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One unit of downloadable work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTask {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub destination: PathBuf,
    /// Primary asset (profile picture, header) fetched with the base session headers.
    pub is_original: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi", "m3u8"];

impl MediaKind {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.');
        if VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn folder_name(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Exists,
    Downloaded,
    Error,
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStatus::Exists => write!(f, "exists"),
            DownloadStatus::Downloaded => write!(f, "downloaded"),
            DownloadStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one persistence attempt. `error` is set only for `DownloadStatus::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub status: DownloadStatus,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn exists(file_name: impl Into<String>) -> Self {
        Self {
            status: DownloadStatus::Exists,
            file_name: file_name.into(),
            error: None,
        }
    }

    pub fn downloaded(file_name: impl Into<String>) -> Self {
        Self {
            status: DownloadStatus::Downloaded,
            file_name: file_name.into(),
            error: None,
        }
    }

    pub fn error(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: DownloadStatus::Error,
            file_name: file_name.into(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == DownloadStatus::Error
    }
}
