// ABOUTME: Per-task derived state and the final persisted result record
// ABOUTME: Defines status transitions, resource accounting, and the TaskResult shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::failure::FailureDescriptor;
use crate::agent::{AgentSnapshot, ProgressEvent, ProgressKind, UsageDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Passed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Passed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Passed => write!(f, "passed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Accumulated resource counters for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
}

impl ResourceUsage {
    pub fn accumulate(&mut self, delta: &UsageDelta) {
        self.input_tokens += delta.input_tokens;
        self.output_tokens += delta.output_tokens;
        self.input_cost += delta.input_cost;
        self.output_cost += delta.output_cost;
    }
}

/// The disjoint success/failure verdict for a task. Failure outcomes always
/// carry a descriptor; the aggregator never infers one.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOutcome {
    Passed,
    Failed(FailureDescriptor),
}

/// Derived, per-task record maintained by the state aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub task_id: String,
    pub status: TaskStatus,
    pub failure: Option<FailureDescriptor>,
    pub usage: ResourceUsage,
    pub action_count: u64,
    pub memory: serde_json::Value,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl TaskState {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            failure: None,
            usage: ResourceUsage::default(),
            action_count: 0,
            memory: serde_json::Value::Null,
            last_event_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Merge a progress event. Usage counters accumulate; snapshots replace
    /// the previous one. A pending task becomes running on its first event.
    pub fn apply(&mut self, event: &ProgressEvent) {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Running;
        }

        match &event.kind {
            ProgressKind::Usage(delta) => self.usage.accumulate(delta),
            ProgressKind::Snapshot(AgentSnapshot {
                action_count,
                memory,
            }) => {
                self.action_count = *action_count;
                self.memory = memory.clone();
            }
        }

        self.last_event_at = Some(event.at);
    }

    pub fn finalize(&mut self, outcome: TerminalOutcome) {
        match outcome {
            TerminalOutcome::Passed => self.status = TaskStatus::Passed,
            TerminalOutcome::Failed(failure) => {
                self.status = TaskStatus::Failed;
                self.failure = Some(failure);
            }
        }
    }
}

/// Final, immutable record of a completed task. Written once per task and
/// never updated after persistence. Field names are part of the on-disk
/// contract consumed by downstream tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub success: bool,
    /// Elapsed wall-clock time in milliseconds.
    pub time: u64,
    pub action_count: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_input_cost: f64,
    pub total_output_cost: f64,
    /// Last known agent snapshot, kept for postmortem analysis.
    pub memory: serde_json::Value,
    /// Crash-recovery attempts consumed before the verdict.
    pub crash_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDescriptor>,
}

impl TaskResult {
    pub fn passed(state: &TaskState, elapsed: Duration, crash_attempts: u32) -> Self {
        Self {
            success: true,
            time: elapsed.as_millis() as u64,
            action_count: state.action_count,
            total_input_tokens: state.usage.input_tokens,
            total_output_tokens: state.usage.output_tokens,
            total_input_cost: state.usage.input_cost,
            total_output_cost: state.usage.output_cost,
            memory: state.memory.clone(),
            crash_attempts,
            error: None,
            timed_out: None,
            failure: None,
        }
    }

    pub fn failed(
        state: &TaskState,
        elapsed: Duration,
        crash_attempts: u32,
        failure: FailureDescriptor,
        message: String,
        timed_out: bool,
    ) -> Self {
        Self {
            success: false,
            time: elapsed.as_millis() as u64,
            action_count: state.action_count,
            total_input_tokens: state.usage.input_tokens,
            total_output_tokens: state.usage.output_tokens,
            total_input_cost: state.usage.input_cost,
            total_output_cost: state.usage.output_cost,
            memory: state.memory.clone(),
            crash_attempts,
            error: Some(message),
            timed_out: Some(timed_out),
            failure: Some(failure),
        }
    }

    /// Synthetic failure for a supervision flow that never produced a
    /// verdict of its own (for example a panicked supervision task).
    pub fn aborted(message: String) -> Self {
        Self {
            success: false,
            time: 0,
            action_count: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_input_cost: 0.0,
            total_output_cost: 0.0,
            memory: serde_json::Value::Null,
            crash_attempts: 0,
            error: Some(message.clone()),
            timed_out: Some(false),
            failure: Some(FailureDescriptor::Unknown { message }),
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out.unwrap_or(false)
    }
}
