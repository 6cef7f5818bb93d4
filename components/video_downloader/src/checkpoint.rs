// components/video_downloader/src/checkpoint.rs
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::CheckpointError;
use crate::types::PlaylistCheckpoint;

/// Well-known checkpoint file name, one per working directory
pub const CHECKPOINT_FILE: &str = "download_state.json";

/// Reads and writes the playlist checkpoint file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store backed by `download_state.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CHECKPOINT_FILE),
        }
    }

    /// Store backed by `download_state.json` in the current working directory
    pub fn in_current_dir() -> Self {
        Self {
            path: PathBuf::from(CHECKPOINT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the checkpoint file with the given state
    pub async fn save(&self, checkpoint: &PlaylistCheckpoint) -> Result<(), CheckpointError> {
        let json = serde_json::to_string_pretty(checkpoint)
            .map_err(|e| CheckpointError::json(&self.path, e))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| CheckpointError::io(&self.path, e))?;

        debug!("Checkpoint saved to {}", self.path.display());
        Ok(())
    }

    /// Load the checkpoint, reporting why it could not be used
    ///
    /// Returns `Ok(None)` when there is no checkpoint file.
    pub async fn try_load(&self) -> Result<Option<PlaylistCheckpoint>, CheckpointError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::io(&self.path, e)),
        };

        let checkpoint: PlaylistCheckpoint =
            serde_json::from_slice(&bytes).map_err(|e| CheckpointError::json(&self.path, e))?;

        if checkpoint.total_count != checkpoint.items.len() {
            return Err(CheckpointError::Inconsistent {
                declared: checkpoint.total_count,
                actual: checkpoint.items.len(),
            });
        }

        Ok(Some(checkpoint))
    }

    /// Load the checkpoint, treating unreadable or corrupt files as absent
    pub async fn load(&self) -> Option<PlaylistCheckpoint> {
        match self.try_load().await {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                warn!("Ignoring checkpoint {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
