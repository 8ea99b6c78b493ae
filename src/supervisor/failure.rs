// ABOUTME: Failure taxonomy, classification rules, and rendering contract
// ABOUTME: Maps raw agent error signals onto a fixed five-variant taxonomy

use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, BugSeverity};

/// Transient infrastructure signals eligible for crash recovery. Browser
/// engines fail non-deterministically under load; these messages identify
/// the known flavors of that noise.
const CRASH_SIGNALS: &[&str] = &[
    "net::ERR_ABORTED",
    "Target page, context or browser has been closed",
    "Target closed",
    "browser has been closed",
    "Connection closed",
    "ECONNRESET",
    "ECONNREFUSED",
    "ENOENT",
];

/// Why a task failed. Exactly one variant is active per terminal failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum FailureDescriptor {
    Network {
        message: String,
    },
    Browser {
        message: String,
    },
    Unknown {
        message: String,
    },
    Misalignment {
        message: String,
    },
    Bug {
        title: String,
        expected_result: String,
        actual_result: String,
        severity: BugSeverity,
    },
}

/// Classify a raw error signal into the failure taxonomy. Pure function,
/// total over every error an agent can report.
pub fn classify(error: &AgentError) -> FailureDescriptor {
    match error {
        AgentError::Misalignment { message } => FailureDescriptor::Misalignment {
            message: message.clone(),
        },
        AgentError::Bug {
            title,
            expected_result,
            actual_result,
            severity,
        } => FailureDescriptor::Bug {
            title: title.clone(),
            expected_result: expected_result.clone(),
            actual_result: actual_result.clone(),
            severity: *severity,
        },
        AgentError::Network(message) => FailureDescriptor::Network {
            message: message.clone(),
        },
        AgentError::Browser(message) => FailureDescriptor::Browser {
            message: message.clone(),
        },
        AgentError::Other(message) => FailureDescriptor::Unknown {
            message: message.clone(),
        },
    }
}

/// True only for the fixed set of transient infrastructure signals.
/// Agent-reported semantic outcomes (misalignment, confirmed bugs) are
/// deterministic verdicts and never eligible for retry.
pub fn is_recoverable_crash(error: &AgentError) -> bool {
    match error {
        AgentError::Misalignment { .. } | AgentError::Bug { .. } => false,
        other => {
            let text = other.to_string();
            CRASH_SIGNALS.iter().any(|signal| text.contains(signal))
        }
    }
}

/// Render a failure descriptor as a human-readable paragraph. Pure, no I/O.
/// The match is exhaustive so adding a variant without a rendering is a
/// compile error rather than silent empty output.
pub fn describe(failure: &FailureDescriptor) -> String {
    match failure {
        FailureDescriptor::Network { message } => format!("network failure: {}", message),
        FailureDescriptor::Browser { message } => format!("browser failure: {}", message),
        FailureDescriptor::Unknown { message } => format!("unknown failure: {}", message),
        FailureDescriptor::Misalignment { message } => format!("misalignment: {}", message),
        FailureDescriptor::Bug {
            title,
            expected_result,
            actual_result,
            severity,
        } => format!(
            "bug: {}\n  expected: {}\n  actual: {}\n  severity: {}",
            title, expected_result, actual_result, severity
        ),
    }
}
