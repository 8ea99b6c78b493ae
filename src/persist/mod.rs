// ABOUTME: Durable persistence of task results as per-task JSON files
// ABOUTME: One <task_id>.json per terminal outcome, plus postmortem reads

pub mod error;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::supervisor::TaskResult;

pub use error::{PersistError, Result};

/// Sink receiving exactly one result per task on every terminal outcome.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn persist(&self, task_id: &str, result: &TaskResult) -> Result<()>;
}

/// Writes each result as pretty-printed JSON under `<dir>/<task_id>.json`.
pub struct JsonResultSink {
    dir: PathBuf,
}

impl JsonResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, task_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", task_id))
    }
}

#[async_trait]
impl ResultSink for JsonResultSink {
    async fn persist(&self, task_id: &str, result: &TaskResult) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistError::WriteError {
                task_id: task_id.to_string(),
                message: format!("failed to create {}: {}", self.dir.display(), e),
            })?;

        let payload = serde_json::to_string_pretty(result)?;
        let path = self.path_for(task_id);

        fs::write(&path, &payload)
            .await
            .map_err(|e| PersistError::WriteError {
                task_id: task_id.to_string(),
                message: format!("failed to write {}: {}", path.display(), e),
            })?;

        debug!(
            "persisted result for task {} ({} bytes)",
            task_id,
            payload.len()
        );
        Ok(())
    }
}

/// Load every persisted result from a directory, keyed by the task id taken
/// from the file name. Sorted by id for stable reporting output.
pub async fn load_results(dir: &Path) -> Result<Vec<(String, TaskResult)>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| PersistError::ReadError {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut results = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let task_id = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };

        let contents = fs::read_to_string(&path)
            .await
            .map_err(|e| PersistError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let result: TaskResult =
            serde_json::from_str(&contents).map_err(|e| PersistError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        results.push((task_id, result));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results)
}
