// ABOUTME: JSONL task roster loading
// ABOUTME: Parses newline-delimited task records into an ordered roster

pub mod error;

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::agent::Task;

pub use error::{ManifestError, Result};

/// One roster line: `{"id": ..., "ques": ..., "web": ...}`.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    id: String,
    ques: String,
    web: String,
}

/// Load a JSONL task roster, preserving file order.
pub async fn load_tasks(path: &Path) -> Result<IndexMap<String, Task>> {
    let contents = fs::read_to_string(path).await.map_err(|e| ManifestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let tasks = parse_tasks(&contents)?;
    debug!("loaded {} tasks from {}", tasks.len(), path.display());
    Ok(tasks)
}

/// Parse roster contents. Blank lines are skipped; malformed records and
/// duplicate ids are hard errors naming the line.
pub fn parse_tasks(contents: &str) -> Result<IndexMap<String, Task>> {
    let mut tasks = IndexMap::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: TaskRecord =
            serde_json::from_str(line).map_err(|e| ManifestError::InvalidRecord {
                line: index + 1,
                message: e.to_string(),
            })?;

        if tasks.contains_key(&record.id) {
            return Err(ManifestError::DuplicateId {
                id: record.id,
                line: index + 1,
            });
        }

        tasks.insert(
            record.id.clone(),
            Task::new(record.id, record.ques, record.web),
        );
    }

    Ok(tasks)
}
