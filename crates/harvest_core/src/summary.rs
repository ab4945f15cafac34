use serde::{Deserialize, Serialize};

use crate::{DownloadResult, DownloadStatus, Profile};

/// Output of a completed run. Per-task failures are data inside `downloads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: bool,
    pub profile: Profile,
    pub total_requested: Option<usize>,
    pub total_processed: usize,
    pub downloads: Vec<DownloadResult>,
}

impl RunSummary {
    pub fn new(
        profile: Profile,
        total_requested: Option<usize>,
        downloads: Vec<DownloadResult>,
    ) -> Self {
        Self {
            status: true,
            profile,
            total_requested,
            total_processed: downloads.len(),
            downloads,
        }
    }

    pub fn count(&self, status: DownloadStatus) -> usize {
        self.downloads.iter().filter(|d| d.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.downloads.iter().any(DownloadResult::is_error)
    }
}

/// Output of a run aborted by a run-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub status: bool,
    pub error: String,
}

impl RunFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: false,
            error: error.into(),
        }
    }
}
