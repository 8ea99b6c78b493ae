// ABOUTME: Event-driven finite-state tracking across supervised tasks
// ABOUTME: Maintains a copy-on-write snapshot mapping task ids to task states

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::result::{TaskState, TerminalOutcome};
use crate::agent::{ProgressEvent, Task};

/// Single writer of the task-id to state mapping. Every mutation swaps in a
/// brand-new map, so a reader holding a prior snapshot never observes a
/// partially updated record.
#[derive(Debug, Default)]
pub struct StateAggregator {
    states: RwLock<Arc<HashMap<String, TaskState>>>,
}

impl StateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task as pending. Must happen before any event referencing
    /// the task is accepted; a re-registration resets the task for a fresh
    /// supervision run.
    pub async fn register(&self, task: &Task) {
        let mut states = self.states.write().await;

        if states.contains_key(&task.id) {
            debug!("re-registering task {}, resetting its state", task.id);
        }

        let mut next = (**states).clone();
        next.insert(task.id.clone(), TaskState::new(task.id.clone()));
        *states = Arc::new(next);
    }

    /// Merge one progress event into the state for `task_id`. Events for
    /// unknown tasks are dropped rather than implicitly creating orphaned
    /// records, and events for finalized tasks are discarded so a late
    /// emitter can never overwrite a verdict.
    pub async fn record_event(&self, task_id: &str, event: ProgressEvent) {
        let mut states = self.states.write().await;

        let current = match states.get(task_id) {
            Some(state) => state,
            None => {
                warn!("dropping progress event for unregistered task {}", task_id);
                return;
            }
        };

        if current.is_terminal() {
            debug!("discarding late event for finalized task {}", task_id);
            return;
        }

        let mut updated = current.clone();
        updated.apply(&event);

        let mut next = (**states).clone();
        next.insert(task_id.to_string(), updated);
        *states = Arc::new(next);
    }

    /// Record the terminal verdict for a task, at most once. A second call
    /// for the same task is a no-op, so the first verdict always stands.
    pub async fn record_terminal(&self, task_id: &str, outcome: TerminalOutcome) {
        let mut states = self.states.write().await;

        let current = match states.get(task_id) {
            Some(state) => state,
            None => {
                warn!("dropping terminal outcome for unregistered task {}", task_id);
                return;
            }
        };

        if current.is_terminal() {
            debug!("task {} already finalized, keeping first verdict", task_id);
            return;
        }

        let mut updated = current.clone();
        updated.finalize(outcome);

        let mut next = (**states).clone();
        next.insert(task_id.to_string(), updated);
        *states = Arc::new(next);
    }

    /// Point-in-time, read-only copy of all tracked task states. Cheap to
    /// take (an Arc clone) and never torn by concurrent writes.
    pub async fn snapshot(&self) -> Arc<HashMap<String, TaskState>> {
        Arc::clone(&*self.states.read().await)
    }

    pub async fn state_of(&self, task_id: &str) -> Option<TaskState> {
        self.states.read().await.get(task_id).cloned()
    }
}
