// ABOUTME: Error types reported by agents and execution-context collaborators
// ABOUTME: These are the raw failure signals the classifier consumes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity attached to an agent-reported confirmed defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for BugSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugSeverity::Critical => write!(f, "critical"),
            BugSeverity::High => write!(f, "high"),
            BugSeverity::Medium => write!(f, "medium"),
            BugSeverity::Low => write!(f, "low"),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The agent observed page state that contradicts what the task expects.
    #[error("misalignment: {message}")]
    Misalignment { message: String },

    /// The agent confirmed a defect in the application under test.
    #[error("bug: {title}")]
    Bug {
        title: String,
        expected_result: String,
        actual_result: String,
        severity: BugSeverity,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
