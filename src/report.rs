// src/report.rs

//! Observation report.
//!
//! This is the harness's user-facing output, not logging: every line goes
//! straight to stderr (unbuffered) at the moment it happens, so the order of
//! lines reflects the real execution order. Under parallel strategies that
//! order is not deterministic.

use crate::engine::BatchOutcome;
use crate::strategy::Strategy;
use crate::task::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reporter {
    #[default]
    Stderr,
    /// Used by tests and library callers that only want the returned records.
    Silent,
}

impl Reporter {
    pub fn scenario_started(self, strategy: &Strategy, tasks: usize) {
        if self == Reporter::Stderr {
            match strategy.kind {
                Some(kind) => eprintln!("Scenario {}", kind.number()),
                None => eprintln!("Custom scenario"),
            }
            eprintln!("  {strategy}, {tasks} tasks");
        }
    }

    pub fn caller_marker(self, marker: &str) {
        if self == Reporter::Stderr {
            eprintln!("In main, tx is {marker}");
        }
    }

    pub fn task_finished(self, record: &TaskRecord) {
        if self == Reporter::Stderr {
            eprintln!(
                "Task {} slept for {} units. My transaction is {} within {}",
                record.index,
                record.wait.units,
                record.marker_at_resume,
                record.observed_entry_marker
            );
        }
    }

    pub fn batch_finished(self, outcome: &BatchOutcome) {
        if self == Reporter::Stderr {
            let hazards = outcome.hazards();
            eprintln!("In main, tx is {}.", outcome.final_marker);
            eprintln!(
                "  wall {:?} for {:?} of waits, peak {} of {} carriers held; \
                 inherited {}, bled {}, lost {}",
                outcome.elapsed,
                outcome.total_wait,
                outcome.peak_occupancy,
                outcome.capacity,
                hazards.inherited,
                hazards.bleed,
                hazards.loss,
            );
        }
    }
}
