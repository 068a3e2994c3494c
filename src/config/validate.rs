// src/config/validate.rs

use crate::config::model::{HarnessConfig, RawHarnessConfig};
use crate::errors::{HarnessError, Result};

impl TryFrom<RawHarnessConfig> for HarnessConfig {
    type Error = HarnessError;

    fn try_from(raw: RawHarnessConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(HarnessConfig::new_unchecked(raw.harness, raw.pool, raw.wait))
    }
}

fn validate_raw_config(cfg: &RawHarnessConfig) -> Result<()> {
    validate_harness(cfg)?;
    validate_pools(cfg)?;
    validate_wait(cfg)?;
    Ok(())
}

fn validate_harness(cfg: &RawHarnessConfig) -> Result<()> {
    if cfg.harness.tasks == 0 {
        return Err(config_error("[harness].tasks must be >= 1 (got 0)"));
    }
    if cfg.harness.pooled_tasks == Some(0) {
        return Err(config_error("[harness].pooled_tasks must be >= 1 (got 0)"));
    }
    if cfg.harness.initial_marker.trim().is_empty() {
        return Err(config_error("[harness].initial_marker must not be empty"));
    }
    Ok(())
}

fn validate_pools(cfg: &RawHarnessConfig) -> Result<()> {
    if cfg.pool.bounded_size == Some(0) {
        return Err(config_error("[pool].bounded_size must be >= 1 (got 0)"));
    }
    if cfg.pool.wide_size == Some(0) {
        return Err(config_error("[pool].wide_size must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_wait(cfg: &RawHarnessConfig) -> Result<()> {
    if cfg.wait.unit_ms == 0 {
        return Err(config_error("[wait].unit_ms must be >= 1 (got 0)"));
    }
    if cfg.wait.min_units > cfg.wait.max_units {
        return Err(HarnessError::ConfigError(format!(
            "[wait].min_units ({}) must not exceed [wait].max_units ({})",
            cfg.wait.min_units, cfg.wait.max_units
        )));
    }
    Ok(())
}

fn config_error(msg: &str) -> HarnessError {
    HarnessError::ConfigError(msg.to_string())
}
