// ABOUTME: Bounded-concurrency supervision of a batch of tasks
// ABOUTME: Each task gets its own supervisor invocation and execution context

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use super::result::TaskResult;
use super::runner::TaskSupervisor;
use crate::agent::{AgentFactory, ContextProvider, Task};
use crate::persist::ResultSink;

/// Runs many tasks through independent supervisor invocations with a
/// concurrency cap. Tasks never share an execution context, and attempts
/// for one task stay strictly sequential inside its invocation.
pub struct SupervisorPool {
    supervisor: Arc<TaskSupervisor>,
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

impl SupervisorPool {
    pub fn new(supervisor: Arc<TaskSupervisor>, max_concurrent: usize) -> Self {
        Self {
            supervisor,
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Supervise every task, returning one result per task in submission
    /// order. A panicked supervision yields a synthetic failed result
    /// rather than poisoning the rest of the batch.
    pub async fn run_all(
        &self,
        tasks: Vec<Task>,
        provider: Arc<dyn ContextProvider>,
        factory: Arc<dyn AgentFactory>,
        sink: Arc<dyn ResultSink>,
    ) -> Vec<TaskResult> {
        info!(
            "supervising batch of {} tasks (max {} concurrent)",
            tasks.len(),
            self.max_concurrent
        );

        let futures: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let permit = Arc::clone(&self.semaphore);
                let supervisor = Arc::clone(&self.supervisor);
                let provider = Arc::clone(&provider);
                let factory = Arc::clone(&factory);
                let sink = Arc::clone(&sink);

                tokio::spawn(async move {
                    let _permit = permit.acquire().await.expect("Semaphore closed");
                    debug!("starting supervision of task {}", task.id);
                    supervisor
                        .run(&task, provider.as_ref(), factory.as_ref(), sink.as_ref())
                        .await
                })
            })
            .collect();

        let joined = join_all(futures).await;

        let mut results = Vec::with_capacity(joined.len());
        for join in joined {
            match join {
                Ok(result) => results.push(result),
                Err(join_error) => {
                    error!("supervision task aborted: {}", join_error);
                    results.push(TaskResult::aborted(format!(
                        "supervision aborted: {}",
                        join_error
                    )));
                }
            }
        }

        info!("batch supervision completed, {} results", results.len());
        results
    }
}
