// ABOUTME: Command implementations for the helmsman CLI
// ABOUTME: Roster validation and postmortem reporting over persisted results

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use super::Config;
use crate::manifest;
use crate::persist;
use crate::supervisor::describe;

/// Parse a task manifest and print the roster without running anything.
pub async fn plan_tasks(path: &Path, _config: &Config) -> Result<()> {
    let tasks = manifest::load_tasks(path).await?;
    info!("loaded {} tasks from {}", tasks.len(), path.display());

    for task in tasks.values() {
        println!(
            "{:<28} {:<44} {}",
            task.id,
            task.url,
            truncate(&task.instruction, 60)
        );
    }

    println!("\n{} tasks", tasks.len());
    Ok(())
}

/// Load persisted results and print a per-task summary.
pub async fn report_results(
    results_dir: Option<PathBuf>,
    failed_only: bool,
    config: &Config,
) -> Result<()> {
    let dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
    let results = persist::load_results(&dir).await?;

    let total = results.len();
    let mut passed = 0usize;
    let mut timed_out = 0usize;

    for (task_id, result) in &results {
        if result.success {
            passed += 1;
        }
        if result.is_timed_out() {
            timed_out += 1;
        }

        if failed_only && result.success {
            continue;
        }

        let verdict = if result.success { "pass" } else { "fail" };
        println!(
            "{:<28} {:<4} {:>8}ms {:>4} actions {:>8} tokens",
            task_id,
            verdict,
            result.time,
            result.action_count,
            result.total_input_tokens + result.total_output_tokens
        );

        if let Some(failure) = &result.failure {
            for line in describe(failure).lines() {
                println!("    {}", line);
            }
        }
    }

    let failed = total - passed;
    let pass_rate = if total > 0 {
        (passed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "\n{} tasks: {} passed, {} failed ({} timed out), {:.1}% pass rate",
        total, passed, failed, timed_out, pass_rate
    );
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_long_text_adds_ellipsis() {
        let long = "find the cheapest direct flight from Lisbon to Tokyo";
        let truncated = truncate(long, 20);

        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 20);
    }
}
