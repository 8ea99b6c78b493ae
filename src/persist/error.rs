// ABOUTME: Error types for result persistence operations
// ABOUTME: Covers serialization and filesystem faults around the result sink

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to write result for task {task_id}: {message}")]
    WriteError { task_id: String, message: String },

    #[error("failed to read result file {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PersistError>;
