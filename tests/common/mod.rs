// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Scripted agent and context fakes for driving the supervisor

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use helmsman::agent::{
    Agent, AgentError, AgentFactory, AgentSnapshot, ContextProvider, EventSender,
    ExecutionContext, ProgressEvent, Task, UsageDelta,
};
use helmsman::persist::{PersistError, ResultSink};
use helmsman::supervisor::TaskResult;

/// What one supervised attempt should do.
#[derive(Clone)]
pub enum AttemptScript {
    /// Emit the given events, then complete successfully.
    Succeed(Vec<ProgressEvent>),
    /// Emit the given events, then fail with the error.
    Fail(Vec<ProgressEvent>, AgentError),
    /// Never settle until cancelled.
    Hang,
    /// Fail before a context even exists.
    FailCreate(AgentError),
}

pub struct HarnessInner {
    scripts: Mutex<VecDeque<AttemptScript>>,
    pub contexts_created: AtomicUsize,
    pub contexts_closed: AtomicUsize,
    pub agents_stopped: AtomicUsize,
    live_contexts: AtomicUsize,
    max_live_contexts: AtomicUsize,
    fail_context_close: AtomicBool,
}

/// Implements both the context provider and the agent factory so a test can
/// hand one object to the supervisor and inspect it afterwards.
#[derive(Clone)]
pub struct Harness {
    inner: Arc<HarnessInner>,
}

impl Harness {
    pub fn contexts_created(&self) -> usize {
        self.inner.contexts_created.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.inner.contexts_closed.load(Ordering::SeqCst)
    }

    pub fn agents_stopped(&self) -> usize {
        self.inner.agents_stopped.load(Ordering::SeqCst)
    }

    pub fn max_live_contexts(&self) -> usize {
        self.inner.max_live_contexts.load(Ordering::SeqCst)
    }
}

pub struct HarnessBuilder {
    scripts: VecDeque<AttemptScript>,
    fail_context_close: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            scripts: VecDeque::new(),
            fail_context_close: false,
        }
    }

    /// Attempt crashes with a transient browser-infrastructure message.
    pub fn crash(mut self, message: &str) -> Self {
        self.scripts
            .push_back(AttemptScript::Fail(vec![], AgentError::Browser(message.to_string())));
        self
    }

    pub fn succeed(mut self) -> Self {
        self.scripts.push_back(AttemptScript::Succeed(vec![]));
        self
    }

    pub fn succeed_with(mut self, events: Vec<ProgressEvent>) -> Self {
        self.scripts.push_back(AttemptScript::Succeed(events));
        self
    }

    pub fn fail_with(mut self, error: AgentError) -> Self {
        self.scripts.push_back(AttemptScript::Fail(vec![], error));
        self
    }

    pub fn fail_with_events(mut self, events: Vec<ProgressEvent>, error: AgentError) -> Self {
        self.scripts.push_back(AttemptScript::Fail(events, error));
        self
    }

    pub fn hang(mut self) -> Self {
        self.scripts.push_back(AttemptScript::Hang);
        self
    }

    pub fn fail_create(mut self, error: AgentError) -> Self {
        self.scripts.push_back(AttemptScript::FailCreate(error));
        self
    }

    pub fn fail_context_close(mut self) -> Self {
        self.fail_context_close = true;
        self
    }

    pub fn build(self) -> Harness {
        Harness {
            inner: Arc::new(HarnessInner {
                scripts: Mutex::new(self.scripts),
                contexts_created: AtomicUsize::new(0),
                contexts_closed: AtomicUsize::new(0),
                agents_stopped: AtomicUsize::new(0),
                live_contexts: AtomicUsize::new(0),
                max_live_contexts: AtomicUsize::new(0),
                fail_context_close: AtomicBool::new(self.fail_context_close),
            }),
        }
    }
}

struct ScriptedContext {
    inner: Arc<HarnessInner>,
    closed: AtomicBool,
}

#[async_trait]
impl ExecutionContext for ScriptedContext {
    async fn close(&self) -> Result<(), AgentError> {
        // Idempotent: only the first close releases the slot.
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.inner.live_contexts.fetch_sub(1, Ordering::SeqCst);
            self.inner.contexts_closed.fetch_add(1, Ordering::SeqCst);

            if self.inner.fail_context_close.load(Ordering::SeqCst) {
                return Err(AgentError::Browser(
                    "failed to dispose browser context".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ContextProvider for Harness {
    async fn create(&self) -> Result<Box<dyn ExecutionContext>, AgentError> {
        {
            let mut scripts = self.inner.scripts.lock().unwrap();
            if let Some(AttemptScript::FailCreate(_)) = scripts.front() {
                match scripts.pop_front() {
                    Some(AttemptScript::FailCreate(error)) => return Err(error),
                    _ => unreachable!(),
                }
            }
        }

        self.inner.contexts_created.fetch_add(1, Ordering::SeqCst);
        let live = self.inner.live_contexts.fetch_add(1, Ordering::SeqCst) + 1;

        loop {
            let max = self.inner.max_live_contexts.load(Ordering::SeqCst);
            if live <= max
                || self
                    .inner
                    .max_live_contexts
                    .compare_exchange_weak(max, live, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                break;
            }
        }

        Ok(Box::new(ScriptedContext {
            inner: Arc::clone(&self.inner),
            closed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedAgent {
    script: AttemptScript,
    events: EventSender,
    inner: Arc<HarnessInner>,
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn run(&self, _instruction: &str, cancel: CancellationToken) -> Result<(), AgentError> {
        match &self.script {
            AttemptScript::Succeed(events) => {
                for event in events {
                    self.events.send(event.clone());
                }
                Ok(())
            }
            AttemptScript::Fail(events, error) => {
                for event in events {
                    self.events.send(event.clone());
                }
                Err(error.clone())
            }
            AttemptScript::Hang => {
                cancel.cancelled().await;
                Err(AgentError::Other("run cancelled".to_string()))
            }
            AttemptScript::FailCreate(error) => Err(error.clone()),
        }
    }

    async fn stop(&self) -> Result<(), AgentError> {
        self.inner.agents_stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AgentFactory for Harness {
    async fn build(
        &self,
        _task: &Task,
        _context: &dyn ExecutionContext,
        events: EventSender,
    ) -> Result<Box<dyn Agent>, AgentError> {
        let script = self
            .inner
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AttemptScript::Succeed(vec![]));

        Ok(Box::new(ScriptedAgent {
            script,
            events,
            inner: Arc::clone(&self.inner),
        }))
    }
}

/// In-memory sink recording every persisted result.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<(String, TaskResult)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, TaskResult)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn persist(&self, task_id: &str, result: &TaskResult) -> Result<(), PersistError> {
        self.records
            .lock()
            .unwrap()
            .push((task_id.to_string(), result.clone()));
        Ok(())
    }
}

/// Sink that always fails, for exercising the secondary-fault path.
pub struct FailingSink;

#[async_trait]
impl ResultSink for FailingSink {
    async fn persist(&self, task_id: &str, _result: &TaskResult) -> Result<(), PersistError> {
        Err(PersistError::WriteError {
            task_id: task_id.to_string(),
            message: "disk full".to_string(),
        })
    }
}

pub fn usage_event(input_tokens: u64, output_tokens: u64) -> ProgressEvent {
    ProgressEvent::usage(UsageDelta {
        input_tokens,
        output_tokens,
        input_cost: input_tokens as f64 * 0.00001,
        output_cost: output_tokens as f64 * 0.00003,
    })
}

pub fn snapshot_event(action_count: u64, memory: &str) -> ProgressEvent {
    ProgressEvent::snapshot(AgentSnapshot {
        action_count,
        memory: json!(memory),
    })
}

pub fn test_task(id: &str) -> Task {
    Task::new(id, "Find the pricing page and note the monthly cost", "https://example.com")
}
