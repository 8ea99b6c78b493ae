// ABOUTME: Per-task retry, timeout, and cleanup loop for agent execution
// ABOUTME: Runs one task in an isolated context and emits a single verdict

use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::aggregator::StateAggregator;
use super::failure::{classify, is_recoverable_crash, FailureDescriptor};
use super::options::SupervisorOptions;
use super::result::{TaskResult, TaskState, TerminalOutcome};
use crate::agent::{
    Agent, AgentError, AgentFactory, ContextProvider, EventSender, ExecutionContext, Task,
};
use crate::persist::ResultSink;

/// Supervises one task at a time: acquires an execution context, runs an
/// agent against a wall-clock deadline, recovers from transient crashes
/// within a bounded retry budget, and always releases both the agent and
/// the context before returning.
pub struct TaskSupervisor {
    aggregator: Arc<StateAggregator>,
    options: SupervisorOptions,
}

enum AttemptOutcome {
    Completed,
    TimedOut,
    Failed(AgentError),
}

impl TaskSupervisor {
    pub fn new(aggregator: Arc<StateAggregator>, options: SupervisorOptions) -> Self {
        Self {
            aggregator,
            options,
        }
    }

    pub fn aggregator(&self) -> &Arc<StateAggregator> {
        &self.aggregator
    }

    pub fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    /// Run a task to its single terminal verdict. Never blocks past the
    /// task's wall-clock deadline and never returns without persisting
    /// exactly one result.
    #[instrument(skip(self, task, provider, factory, sink), fields(task_id = %task.id))]
    pub async fn run(
        &self,
        task: &Task,
        provider: &dyn ContextProvider,
        factory: &dyn AgentFactory,
        sink: &dyn ResultSink,
    ) -> TaskResult {
        self.aggregator.register(task).await;

        let started = Instant::now();
        let deadline = started + self.options.deadline_for(task);
        let mut crash_attempts: u32 = 0;
        let mut attempts: u32 = 0;

        while attempts < self.options.max_attempts {
            attempts += 1;
            let execution_id = Uuid::new_v4();
            info!(
                "starting attempt {}/{} for task {} (execution {})",
                attempts, self.options.max_attempts, task.id, execution_id
            );

            match self.supervise_attempt(task, provider, factory, deadline).await {
                AttemptOutcome::Completed => {
                    info!("task {} completed successfully", task.id);
                    self.aggregator
                        .record_terminal(&task.id, TerminalOutcome::Passed)
                        .await;
                    let state = self.final_state(task).await;
                    let result = TaskResult::passed(&state, started.elapsed(), crash_attempts);
                    self.persist(task, &result, sink).await;
                    return result;
                }
                AttemptOutcome::TimedOut => {
                    let budget = self.options.deadline_for(task);
                    warn!("task {} exceeded its {:?} deadline", task.id, budget);
                    let message = format!("task timed out after {:?}", budget);
                    let failure = FailureDescriptor::Unknown {
                        message: message.clone(),
                    };
                    return self
                        .finalize_failure(task, started, crash_attempts, failure, message, true, sink)
                        .await;
                }
                AttemptOutcome::Failed(err) => {
                    let can_retry = attempts < self.options.max_attempts
                        && Instant::now() < deadline
                        && is_recoverable_crash(&err);

                    if can_retry {
                        crash_attempts += 1;
                        let delay = self.options.backoff_delay(crash_attempts - 1);
                        warn!(
                            "recoverable crash on task {} (attempt {}): {}; retrying in {:?}",
                            task.id, attempts, err, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    error!("task {} failed: {}", task.id, err);
                    let failure = classify(&err);
                    return self
                        .finalize_failure(
                            task,
                            started,
                            crash_attempts,
                            failure,
                            err.to_string(),
                            false,
                            sink,
                        )
                        .await;
                }
            }
        }

        // The bounded counter makes this unreachable; fail loudly rather
        // than hang or fabricate a success.
        error!("retry loop for task {} exited without a verdict", task.id);
        let failure = FailureDescriptor::Unknown {
            message: "retries exhausted".to_string(),
        };
        self.finalize_failure(
            task,
            started,
            crash_attempts,
            failure,
            "retries exhausted".to_string(),
            false,
            sink,
        )
        .await
    }

    /// One supervised attempt: acquire a context, build and race the agent
    /// against the deadline, then release both resources unconditionally.
    async fn supervise_attempt(
        &self,
        task: &Task,
        provider: &dyn ContextProvider,
        factory: &dyn AgentFactory,
        deadline: Instant,
    ) -> AttemptOutcome {
        let context = match provider.create().await {
            Ok(context) => context,
            Err(err) => {
                warn!("failed to acquire execution context for task {}: {}", task.id, err);
                return AttemptOutcome::Failed(err);
            }
        };

        let (events, mut rx) = EventSender::channel();
        let forwarder = {
            let aggregator = Arc::clone(&self.aggregator);
            let task_id = task.id.clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    aggregator.record_event(&task_id, event).await;
                }
            })
        };

        let agent = match factory.build(task, context.as_ref(), events).await {
            Ok(agent) => agent,
            Err(err) => {
                warn!("failed to build agent for task {}: {}", task.id, err);
                Self::release_context(context.as_ref(), &task.id).await;
                // The sender died with the failed build, so the forwarder
                // drains whatever arrived and exits on its own.
                let _ = forwarder.await;
                return AttemptOutcome::Failed(err);
            }
        };

        let cancel = CancellationToken::new();
        let outcome = tokio::select! {
            run = agent.run(&task.instruction, cancel.child_token()) => match run {
                Ok(()) => AttemptOutcome::Completed,
                Err(err) => AttemptOutcome::Failed(err),
            },
            _ = tokio::time::sleep_until(deadline) => {
                debug!("deadline timer fired for task {}", task.id);
                cancel.cancel();
                AttemptOutcome::TimedOut
            }
        };

        // Both releases run on every path; a failure in one never skips
        // the other and never alters the attempt outcome.
        Self::release_agent(agent.as_ref(), &task.id).await;
        Self::release_context(context.as_ref(), &task.id).await;

        drop(agent);
        drop(context);

        if matches!(outcome, AttemptOutcome::TimedOut) {
            // Cleanup proceeds without waiting for the abandoned run to
            // unwind; anything it still emits targets a finalized task.
            forwarder.abort();
        } else {
            let _ = forwarder.await;
        }

        outcome
    }

    async fn release_agent(agent: &dyn Agent, task_id: &str) {
        if let Err(err) = agent.stop().await {
            warn!("failed to stop agent for task {}: {}", task_id, err);
        }
    }

    async fn release_context(context: &dyn ExecutionContext, task_id: &str) {
        if let Err(err) = context.close().await {
            warn!("failed to close execution context for task {}: {}", task_id, err);
        }
    }

    async fn final_state(&self, task: &Task) -> TaskState {
        self.aggregator
            .state_of(&task.id)
            .await
            .unwrap_or_else(|| TaskState::new(task.id.clone()))
    }

    #[allow(clippy::too_many_arguments)]
    async fn finalize_failure(
        &self,
        task: &Task,
        started: Instant,
        crash_attempts: u32,
        failure: FailureDescriptor,
        message: String,
        timed_out: bool,
        sink: &dyn ResultSink,
    ) -> TaskResult {
        self.aggregator
            .record_terminal(&task.id, TerminalOutcome::Failed(failure.clone()))
            .await;

        let state = self.final_state(task).await;
        let result = TaskResult::failed(
            &state,
            started.elapsed(),
            crash_attempts,
            failure,
            message,
            timed_out,
        );
        self.persist(task, &result, sink).await;
        result
    }

    /// Persistence failure is a secondary fault: logged, never allowed to
    /// change the task's recorded outcome.
    async fn persist(&self, task: &Task, result: &TaskResult, sink: &dyn ResultSink) {
        if let Err(err) = sink.persist(&task.id, result).await {
            error!("failed to persist result for task {}: {}", task.id, err);
        }
    }
}
