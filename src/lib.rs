// ABOUTME: Main library module for the helmsman supervision engine
// ABOUTME: Exports all core modules and provides the public API

pub mod agent;
pub mod cli;
pub mod manifest;
pub mod persist;
pub mod supervisor;

// Re-export commonly used types
pub use agent::{
    Agent, AgentError, AgentFactory, AgentSnapshot, BugSeverity, ContextProvider, EventSender,
    ExecutionContext, ProgressEvent, ProgressKind, Task, UsageDelta,
};
pub use persist::{JsonResultSink, ResultSink};
pub use supervisor::{
    classify, describe, is_recoverable_crash, FailureDescriptor, StateAggregator,
    SupervisorOptions, SupervisorPool, TaskResult, TaskState, TaskStatus, TaskSupervisor,
    TerminalOutcome,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
