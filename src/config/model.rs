// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::strategy::{DEFAULT_WIDE_POOL_SIZE, PoolSizes, default_parallelism};
use crate::types::StrategyKind;
use crate::wait::WaitPlan;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [harness]
/// tasks = 9
/// strategy = "naive"
/// initial_marker = "Main"
///
/// [pool]
/// bounded_size = 8
/// wide_size = 64
///
/// [wait]
/// unit_ms = 1000
/// min_units = 1
/// max_units = 4
/// seed = 42
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHarnessConfig {
    #[serde(default)]
    pub harness: HarnessSection,

    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub wait: WaitSection,
}

/// `[harness]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessSection {
    /// Number of tasks per batch for single-carrier scenarios.
    #[serde(default = "default_tasks")]
    pub tasks: usize,

    /// Number of tasks per batch for the pooled scenarios. Defaults to a
    /// larger batch so the pool limit is actually visible.
    #[serde(default)]
    pub pooled_tasks: Option<usize>,

    #[serde(default)]
    pub strategy: StrategyKind,

    /// The caller's ambient marker before every batch.
    #[serde(default = "default_initial_marker")]
    pub initial_marker: String,
}

pub const DEFAULT_TASKS: usize = 9;
pub const DEFAULT_POOLED_TASKS: usize = 49;

fn default_tasks() -> usize {
    DEFAULT_TASKS
}

fn default_initial_marker() -> String {
    "Main".to_string()
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
            pooled_tasks: None,
            strategy: StrategyKind::default(),
            initial_marker: default_initial_marker(),
        }
    }
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PoolSection {
    /// Capacity for the "bounded" quickfix; defaults to the core count.
    #[serde(default)]
    pub bounded_size: Option<usize>,

    /// Capacity for the "wide" quickfix; defaults to 64.
    #[serde(default)]
    pub wide_size: Option<usize>,
}

impl PoolSection {
    pub fn sizes(&self) -> PoolSizes {
        PoolSizes {
            bounded: self.bounded_size.unwrap_or_else(default_parallelism),
            wide: self.wide_size.unwrap_or(DEFAULT_WIDE_POOL_SIZE),
        }
    }
}

/// `[wait]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitSection {
    /// Length of one time unit in milliseconds.
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,

    #[serde(default = "default_min_units")]
    pub min_units: u32,

    /// Inclusive upper bound.
    #[serde(default = "default_max_units")]
    pub max_units: u32,

    /// Fixed seed for reproducible wait durations.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_unit_ms() -> u64 {
    1000
}

fn default_min_units() -> u32 {
    1
}

fn default_max_units() -> u32 {
    4
}

impl Default for WaitSection {
    fn default() -> Self {
        Self {
            unit_ms: default_unit_ms(),
            min_units: default_min_units(),
            max_units: default_max_units(),
            seed: None,
        }
    }
}

/// Validated configuration. Only obtainable through
/// `HarnessConfig::try_from(RawHarnessConfig)`.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    harness: HarnessSection,
    pool: PoolSection,
    wait: WaitSection,
}

impl HarnessConfig {
    pub(crate) fn new_unchecked(
        harness: HarnessSection,
        pool: PoolSection,
        wait: WaitSection,
    ) -> Self {
        Self { harness, pool, wait }
    }

    pub fn tasks(&self) -> usize {
        self.harness.tasks
    }

    pub fn pooled_tasks(&self) -> usize {
        self.harness.pooled_tasks.unwrap_or(DEFAULT_POOLED_TASKS)
    }

    /// Batch size for a scenario: pooled scenarios use the larger batch.
    pub fn tasks_for(&self, kind: StrategyKind) -> usize {
        if kind.uses_bounded_pool() {
            self.pooled_tasks()
        } else {
            self.tasks()
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.harness.strategy
    }

    pub fn initial_marker(&self) -> &str {
        &self.harness.initial_marker
    }

    pub fn pool_sizes(&self) -> PoolSizes {
        self.pool.sizes()
    }

    pub fn unit(&self) -> Duration {
        Duration::from_millis(self.wait.unit_ms)
    }

    pub fn wait_bounds(&self) -> (u32, u32) {
        (self.wait.min_units, self.wait.max_units)
    }

    pub fn seed(&self) -> Option<u64> {
        self.wait.seed
    }

    pub fn wait_plan(&self) -> WaitPlan {
        WaitPlan::new(self.unit(), self.wait.min_units, self.wait.max_units, self.wait.seed)
    }
}
