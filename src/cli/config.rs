// ABOUTME: Configuration management for the helmsman application
// ABOUTME: Handles loading and merging configuration from files and environment variables

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::supervisor::SupervisorOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub deadline_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            max_concurrent_tasks: default_max_concurrent(),
            supervisor: SupervisorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        let options = SupervisorOptions::default();
        Self {
            deadline_secs: options.deadline.as_secs(),
            max_attempts: options.max_attempts,
            retry_delay_ms: options.retry_delay.as_millis() as u64,
            max_retry_delay_ms: options.max_retry_delay.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl SupervisorConfig {
    pub fn to_options(&self) -> SupervisorOptions {
        SupervisorOptions {
            deadline: Duration::from_secs(self.deadline_secs),
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_retry_delay: Duration::from_millis(self.max_retry_delay_ms),
        }
    }
}

impl Config {
    /// Load configuration from a file path or the default locations.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env();
        Ok(config)
    }

    fn find_config_file() -> PathBuf {
        let local = PathBuf::from("helmsman.yaml");
        if local.exists() {
            return local;
        }

        if let Some(home) = std::env::var_os("HOME") {
            let user = PathBuf::from(home).join(".config/helmsman/config.yaml");
            if user.exists() {
                return user;
            }
        }

        local
    }

    /// Environment variables override file values.
    fn merge_env(&mut self) {
        if let Ok(dir) = std::env::var("HELMSMAN_RESULTS_DIR") {
            self.results_dir = PathBuf::from(dir);
        }

        if let Ok(value) = std::env::var("HELMSMAN_MAX_CONCURRENT") {
            if let Ok(parsed) = value.parse() {
                self.max_concurrent_tasks = parsed;
            }
        }

        if let Ok(level) = std::env::var("HELMSMAN_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
