// ABOUTME: Collaborator traits for execution contexts and autonomous agents
// ABOUTME: Defines the Task unit of work and the factory surfaces the supervisor drives

pub mod error;
pub mod event;

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use error::{AgentError, BugSeverity, Result};
pub use event::{AgentSnapshot, EventSender, ProgressEvent, ProgressKind, UsageDelta};

/// An immutable unit of agent-driven work.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub instruction: String,
    pub url: String,
    /// Overrides the supervisor's default wall-clock budget when set.
    pub deadline: Option<Duration>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        instruction: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            url: url.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// An isolated, disposable runtime environment (one browser session).
/// Owned exclusively by a single supervised attempt at a time.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Close the context. Implementations must be idempotent and safe to
    /// call after the context has already become unusable.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn create(&self) -> Result<Box<dyn ExecutionContext>>;
}

/// A long-running autonomous process consuming a task inside a context.
/// The supervisor owns only its lifecycle and its event stream.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Drive the instruction to completion. Implementations must observe the
    /// cancellation token and stop emitting events once it fires.
    async fn run(&self, instruction: &str, cancel: CancellationToken) -> Result<()>;

    /// Forced teardown.
    async fn stop(&self) -> Result<()>;
}

/// Builds an agent bound to a context and a task's entry point. The factory
/// is where task-specific capabilities (for example a terminal "done" action)
/// are wired in before the agent starts.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn build(
        &self,
        task: &Task,
        context: &dyn ExecutionContext,
        events: EventSender,
    ) -> Result<Box<dyn Agent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("task-1", "Find the pricing page", "https://example.com");

        assert_eq!(task.id, "task-1");
        assert_eq!(task.instruction, "Find the pricing page");
        assert_eq!(task.url, "https://example.com");
        assert!(task.deadline.is_none());
    }

    #[test]
    fn test_task_deadline_override() {
        let task = Task::new("task-2", "Log in", "https://example.com/login")
            .with_deadline(Duration::from_secs(120));

        assert_eq!(task.deadline, Some(Duration::from_secs(120)));
    }
}
