use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use futures_util::TryStreamExt;
use harvest_core::DownloadResult;
use harvest_logging::{harvest_debug, harvest_warn};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

use crate::{PersistError, RequestHeaders, Transport};

/// Ensure the destination folder exists; create it (and parents) if missing.
pub fn ensure_folder(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::Folder(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::Folder(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| PersistError::Folder(e.to_string()))
}

/// Streams remote media to `{folder}/{filename}` with skip-if-present semantics.
#[derive(Clone)]
pub struct MediaWriter {
    transport: Arc<dyn Transport>,
}

impl MediaWriter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Never fails: every outcome, including transport and disk errors, is a
    /// [`DownloadResult`]. An existing target short-circuits before any request.
    pub async fn write(
        &self,
        url: &str,
        folder: &Path,
        filename: &str,
        headers: &RequestHeaders,
    ) -> DownloadResult {
        if let Err(err) = ensure_folder(folder) {
            harvest_warn!("Cannot prepare {:?} for {}: {}", folder, filename, err);
            return DownloadResult::error(filename, err.to_string());
        }

        let target = folder.join(filename);
        match tokio::fs::try_exists(&target).await {
            Ok(true) => {
                harvest_debug!("Skipping existing {:?}", target);
                return DownloadResult::exists(filename);
            }
            Ok(false) => {}
            Err(err) => return DownloadResult::error(filename, err.to_string()),
        }

        match self.stream_into(url, folder, &target, headers).await {
            Ok(written) => {
                harvest_debug!("Downloaded {} ({} bytes) to {:?}", url, written, target);
                DownloadResult::downloaded(filename)
            }
            Err(err) => {
                harvest_warn!("Download of {} failed: {}", filename, err);
                DownloadResult::error(filename, err.to_string())
            }
        }
    }

    /// Body goes to a temp file next to the target and is renamed into place
    /// only after the stream completed.
    async fn stream_into(
        &self,
        url: &str,
        folder: &Path,
        target: &Path,
        headers: &RequestHeaders,
    ) -> Result<u64, PersistError> {
        let stream = self.transport.open(url, headers).await?;

        let tmp = NamedTempFile::new_in(folder)?;
        let mut file = tokio::fs::File::from_std(tmp.reopen()?);
        let mut reader = StreamReader::new(stream.body.map_err(io::Error::other));
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
        Ok(written)
    }
}
