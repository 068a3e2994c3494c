// src/engine/mod.rs

//! Batch engine.
//!
//! This module ties together:
//! - the pure batch lifecycle state machine ([`state`])
//! - the join scope used for fire-and-forget dispatch ([`scope`])
//! - the batch runner that fans tasks out to a carrier pool and fans the
//!   records back in ([`runner`])
//! - classification of what each task observed on entry ([`hazard`])

use std::time::Duration;

use crate::strategy::Strategy;
use crate::task::TaskRecord;

pub mod hazard;
pub mod runner;
pub mod scope;
pub mod state;

pub use hazard::{HazardSummary, Observation, classify};
pub use runner::{BatchContext, BatchRunner};
pub use scope::{BatchScope, ScopeToken};
pub use state::{BatchPhase, BatchState};

/// Everything a finished batch hands back to its caller.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub strategy: Strategy,
    /// Caller's ambient marker just before dispatch.
    pub initial_marker: String,
    /// One record per task, ordered by task index (1..=N).
    pub records: Vec<TaskRecord>,
    /// Caller's ambient marker after the join.
    pub final_marker: String,
    pub elapsed: Duration,
    /// Sum of every task's wait.
    pub total_wait: Duration,
    /// Most carriers held at once during the batch.
    pub peak_occupancy: usize,
    pub capacity: usize,
}

impl BatchOutcome {
    /// Record of the task with the given 1-based index.
    pub fn record(&self, index: usize) -> Option<&TaskRecord> {
        index.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn results(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.result.as_str())
    }

    pub fn observed_markers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.observed_entry_marker.as_str())
    }

    /// Task indices in the order they finished.
    pub fn completion_order(&self) -> Vec<usize> {
        let mut by_rank: Vec<_> = self
            .records
            .iter()
            .map(|r| (r.completion_rank, r.index))
            .collect();
        by_rank.sort_unstable();
        by_rank.into_iter().map(|(_, index)| index).collect()
    }

    pub fn observation(&self, index: usize) -> Option<Observation> {
        self.record(index)
            .map(|r| classify(&r.observed_entry_marker, &self.initial_marker))
    }

    pub fn hazards(&self) -> HazardSummary {
        HazardSummary::tally(
            self.observed_markers()
                .map(|m| classify(m, &self.initial_marker)),
        )
    }
}
