use crate::{CoreResult, RecorderError};

use std::{panic::Location, path::PathBuf};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, instrument};

/// Destination for finished recordings.
#[async_trait]
pub trait RecordingSink: Send + Sync {
    /// Persist `container` under `filename`, returning where it landed.
    async fn save(&self, filename: &str, container: &[u8]) -> CoreResult<PathBuf>;
}

/// Writes recordings into a directory using the atomic write pattern.
#[derive(Debug, Clone)]
pub struct FsRecordingSink {
    dir: PathBuf,
}

impl FsRecordingSink {
    /// Sink writing into `dir`, created on first save if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl RecordingSink for FsRecordingSink {
    /// Writes to `<filename>.part` first, syncs, then renames, so a crash
    /// mid-write never leaves a truncated file under the final name.
    #[instrument(skip(self, container), fields(bytes = container.len()))]
    async fn save(&self, filename: &str, container: &[u8]) -> CoreResult<PathBuf> {
        let save_failed = |source: std::io::Error| RecorderError::SaveFailed {
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        if !fs::try_exists(&self.dir).await.map_err(save_failed)? {
            fs::create_dir_all(&self.dir).await.map_err(save_failed)?;
            debug!(dir = ?self.dir, "Created recordings directory");
        }

        let final_path = self.dir.join(filename);
        let temp_path = self.dir.join(format!("{}.part", filename));

        let mut temp_file = fs::File::create(&temp_path).await.map_err(save_failed)?;
        temp_file.write_all(container).await.map_err(save_failed)?;
        temp_file.sync_all().await.map_err(save_failed)?;
        drop(temp_file);

        fs::rename(&temp_path, &final_path)
            .await
            .map_err(save_failed)?;

        info!(path = ?final_path, "Recording saved");

        Ok(final_path)
    }
}
