//! Saved job lists.
//!
//! Every live fetch is written out as a pretty-printed JSON array so a report
//! can be regenerated later, against different window or alias settings,
//! without hitting the API again.

use crate::{FeedError, JobSource};
use std::path::{Path, PathBuf};
use wcp_core::Job;

/// Reads jobs from a file written by [`save_snapshot`].
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JobSource for SnapshotSource {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, FeedError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| FeedError::Snapshot {
                path: self.path.clone(),
                source,
            })?;

        let jobs: Vec<Job> =
            serde_json::from_slice(&bytes).map_err(|source| FeedError::SnapshotFormat {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), count = jobs.len(), "loaded job snapshot");
        Ok(jobs)
    }

    fn describe(&self) -> String {
        format!("snapshot {}", self.path.display())
    }
}

/// Write `jobs` to `path` as an indented JSON array, creating parent
/// directories as needed.
pub async fn save_snapshot(path: &Path, jobs: &[Job]) -> Result<(), FeedError> {
    let io_err = |source| FeedError::Snapshot {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(jobs).map_err(|source| FeedError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;
    tokio::fs::write(path, json).await.map_err(io_err)?;

    tracing::info!(path = %path.display(), count = jobs.len(), "jobs saved to snapshot");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
