// ABOUTME: Error types for task manifest loading
// ABOUTME: Names the offending line for every malformed roster record

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read task manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("duplicate task id '{id}' on line {line}")]
    DuplicateId { id: String, line: usize },
}

pub type Result<T> = std::result::Result<T, ManifestError>;
