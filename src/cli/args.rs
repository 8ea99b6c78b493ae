// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for helmsman

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helmsman")]
#[command(about = "Supervised execution and crash recovery for autonomous browser agents")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a task manifest and list the tasks it contains
    Plan {
        #[arg(help = "Path to JSONL task manifest")]
        tasks: PathBuf,
    },

    /// Summarize persisted task results
    Report {
        #[arg(help = "Directory containing per-task result JSON files")]
        results: Option<PathBuf>,

        #[arg(long, help = "Only show failed tasks")]
        failed_only: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
