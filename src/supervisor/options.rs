// ABOUTME: Tunable limits for supervised task execution
// ABOUTME: Wall-clock deadline, retry budget, and backoff configuration

use std::time::Duration;

use crate::agent::Task;

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Wall-clock budget for one task, shared across crash-recovery
    /// attempts. Retries do not reset the clock.
    pub deadline: Duration,
    /// Total attempt budget, including the first run.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per subsequent retry.
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(15 * 60),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
        }
    }
}

impl SupervisorOptions {
    /// Effective deadline for a task, honoring its per-task override.
    pub fn deadline_for(&self, task: &Task) -> Duration {
        task.deadline.unwrap_or(self.deadline)
    }

    /// Backoff before retry number `retry` (0-indexed), exponential and
    /// capped at `max_retry_delay`.
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let base_ms = self.retry_delay.as_millis() as u64;
        let factor = 1u64 << retry.min(16);
        let delay = Duration::from_millis(base_ms.saturating_mul(factor));

        if delay > self.max_retry_delay {
            self.max_retry_delay
        } else {
            delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SupervisorOptions::default();

        assert_eq!(options.deadline, Duration::from_secs(900));
        assert_eq!(options.max_attempts, 3);
        assert_eq!(options.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let options = SupervisorOptions {
            retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_millis(600),
            ..SupervisorOptions::default()
        };

        assert_eq!(options.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(options.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(options.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(options.backoff_delay(3), Duration::from_millis(600));
        assert_eq!(options.backoff_delay(30), Duration::from_millis(600));
    }

    #[test]
    fn test_task_deadline_override_wins() {
        let options = SupervisorOptions::default();
        let task = Task::new("t1", "do something", "https://example.com")
            .with_deadline(Duration::from_secs(60));

        assert_eq!(options.deadline_for(&task), Duration::from_secs(60));

        let plain = Task::new("t2", "do something else", "https://example.com");
        assert_eq!(options.deadline_for(&plain), Duration::from_secs(900));
    }
}
