// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::RawHarnessConfig;
use crate::types::StrategyKind;

/// Command-line arguments for `carrierlab`.
///
/// Flags override values from `--config`, which override built-in defaults.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "carrierlab",
    version,
    about = "Run batches of tasks under different scheduling strategies and watch ambient context leak.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Tasks per batch. Also used for pooled scenarios unless
    /// `--pooled-tasks` is given.
    #[arg(long, short = 'n', value_name = "N")]
    pub tasks: Option<usize>,

    /// Tasks per batch for the pooled scenarios (S4, S5).
    #[arg(long, value_name = "N")]
    pub pooled_tasks: Option<usize>,

    /// Scenario to run: naive, correct, fake-suspend, quickfix-bounded,
    /// quickfix-wide, fire-and-forget (or s1..s6).
    #[arg(long, short = 's', value_name = "STRATEGY")]
    pub strategy: Option<StrategyKind>,

    /// Capacity of the bounded pool (default: number of cores).
    #[arg(long, value_name = "K")]
    pub pool_size: Option<usize>,

    /// Capacity of the wide pool (default: 64).
    #[arg(long, value_name = "K")]
    pub wide_pool_size: Option<usize>,

    /// Length of one wait time unit in milliseconds.
    #[arg(long, value_name = "MS")]
    pub unit_ms: Option<u64>,

    /// Seed for wait durations.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// The caller's ambient marker before each batch.
    #[arg(long, value_name = "MARKER")]
    pub initial_marker: Option<String>,

    /// Run all six scenarios in order on one harness.
    #[arg(long, conflicts_with = "strategy")]
    pub all: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CARRIERLAB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration and strategies, but run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Apply flag overrides on top of a (file or default) raw config.
    pub fn apply_to(&self, raw: &mut RawHarnessConfig) {
        if let Some(n) = self.tasks {
            raw.harness.tasks = n;
            if self.pooled_tasks.is_none() {
                raw.harness.pooled_tasks = Some(n);
            }
        }
        if let Some(n) = self.pooled_tasks {
            raw.harness.pooled_tasks = Some(n);
        }
        if let Some(kind) = self.strategy {
            raw.harness.strategy = kind;
        }
        if let Some(ref marker) = self.initial_marker {
            raw.harness.initial_marker = marker.clone();
        }
        if let Some(k) = self.pool_size {
            raw.pool.bounded_size = Some(k);
        }
        if let Some(k) = self.wide_pool_size {
            raw.pool.wide_size = Some(k);
        }
        if let Some(ms) = self.unit_ms {
            raw.wait.unit_ms = ms;
        }
        if let Some(seed) = self.seed {
            raw.wait.seed = Some(seed);
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
