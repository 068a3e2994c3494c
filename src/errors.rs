// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::engine::BatchPhase;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The task's carrier went away before the task reported back.
    #[error("Task {index} aborted: its carrier was torn down mid-wait")]
    TaskAborted { index: usize },

    #[error("Invalid batch transition from {from:?}: {reason}")]
    InvalidTransition { from: BatchPhase, reason: String },

    #[error("Carrier pool shut down: {0}")]
    PoolShutDown(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HarnessError>;
