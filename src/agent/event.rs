// ABOUTME: Progress event types emitted by running agents
// ABOUTME: Provides the typed channel surface the state aggregator ingests from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A discrete, timestamped update emitted by an agent. Events are strictly
/// ordered per task because each agent emits them serially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub at: DateTime<Utc>,
    pub kind: ProgressKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressKind {
    /// Resource-usage counters to accumulate.
    Usage(UsageDelta),
    /// A structural snapshot of agent progress, replacing the previous one.
    Snapshot(AgentSnapshot),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDelta {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub action_count: u64,
    pub memory: serde_json::Value,
}

impl ProgressEvent {
    pub fn usage(delta: UsageDelta) -> Self {
        Self {
            at: Utc::now(),
            kind: ProgressKind::Usage(delta),
        }
    }

    pub fn snapshot(snapshot: AgentSnapshot) -> Self {
        Self {
            at: Utc::now(),
            kind: ProgressKind::Snapshot(snapshot),
        }
    }
}

/// Sending half of an agent's progress stream. Cloneable so an agent can
/// hand it to internal workers.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl EventSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sending never fails. Once the supervised attempt is over the receiver
    /// is gone and late events are simply dropped.
    pub fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }

    pub fn usage(&self, delta: UsageDelta) {
        self.send(ProgressEvent::usage(delta));
    }

    pub fn snapshot(&self, snapshot: AgentSnapshot) {
        self.send(ProgressEvent::snapshot(snapshot));
    }
}
