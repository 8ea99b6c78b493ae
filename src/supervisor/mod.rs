// ABOUTME: Task execution and recovery supervision module
// ABOUTME: Retry/timeout/cleanup loop, state aggregation, and failure taxonomy

pub mod aggregator;
pub mod failure;
pub mod options;
pub mod pool;
pub mod result;
pub mod runner;

pub use aggregator::StateAggregator;
pub use failure::{classify, describe, is_recoverable_crash, FailureDescriptor};
pub use options::SupervisorOptions;
pub use pool::SupervisorPool;
pub use result::{ResourceUsage, TaskResult, TaskState, TaskStatus, TerminalOutcome};
pub use runner::TaskSupervisor;
