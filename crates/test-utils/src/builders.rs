#![allow(dead_code)]

use carrierlab::config::{HarnessConfig, RawHarnessConfig};
use carrierlab::types::StrategyKind;

/// Builder for `HarnessConfig` to simplify test setup.
pub struct HarnessConfigBuilder {
    config: RawHarnessConfig,
}

impl HarnessConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawHarnessConfig::default(),
        }
    }

    pub fn tasks(mut self, n: usize) -> Self {
        self.config.harness.tasks = n;
        self
    }

    pub fn pooled_tasks(mut self, n: usize) -> Self {
        self.config.harness.pooled_tasks = Some(n);
        self
    }

    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.config.harness.strategy = kind;
        self
    }

    pub fn initial_marker(mut self, marker: &str) -> Self {
        self.config.harness.initial_marker = marker.to_string();
        self
    }

    pub fn bounded_size(mut self, k: usize) -> Self {
        self.config.pool.bounded_size = Some(k);
        self
    }

    pub fn wide_size(mut self, k: usize) -> Self {
        self.config.pool.wide_size = Some(k);
        self
    }

    /// Wait `min..=max` units of `unit_ms` each, seeded.
    pub fn waits(mut self, unit_ms: u64, min: u32, max: u32, seed: u64) -> Self {
        self.config.wait.unit_ms = unit_ms;
        self.config.wait.min_units = min;
        self.config.wait.max_units = max;
        self.config.wait.seed = Some(seed);
        self
    }

    pub fn raw(self) -> RawHarnessConfig {
        self.config
    }

    pub fn build(self) -> HarnessConfig {
        HarnessConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
