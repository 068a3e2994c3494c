// src/engine/state.rs

//! Pure batch lifecycle state machine.
//!
//! `Idle -> Dispatching -> Joining -> Complete`, with counters that make the
//! join guarantee checkable: a batch can only start joining once all N tasks
//! were dispatched, and can only complete once all N reported back.
//!
//! No Tokio, no carriers; the runner drives it and it is unit tested on its
//! own.

use tracing::debug;

use crate::errors::{HarnessError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Dispatching,
    Joining,
    Complete,
}

#[derive(Debug)]
pub struct BatchState {
    phase: BatchPhase,
    total: usize,
    dispatched: usize,
    completed: usize,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self {
            phase: BatchPhase::Idle,
            total,
            dispatched: 0,
            completed: 0,
        }
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn begin_dispatch(&mut self) -> Result<()> {
        self.expect_phase(BatchPhase::Idle, "dispatch can only start from idle")?;
        self.enter(BatchPhase::Dispatching);
        Ok(())
    }

    pub fn record_dispatch(&mut self) -> Result<()> {
        self.expect_phase(
            BatchPhase::Dispatching,
            "task dispatched outside dispatch phase",
        )?;
        if self.dispatched == self.total {
            return Err(self.invalid(format!("more than {} tasks dispatched", self.total)));
        }
        self.dispatched += 1;
        Ok(())
    }

    pub fn begin_join(&mut self) -> Result<()> {
        self.expect_phase(BatchPhase::Dispatching, "join can only follow dispatch")?;
        if self.dispatched != self.total {
            return Err(self.invalid(format!(
                "join started after {} of {} dispatches",
                self.dispatched, self.total
            )));
        }
        self.enter(BatchPhase::Joining);
        Ok(())
    }

    pub fn record_completion(&mut self) -> Result<()> {
        self.expect_phase(
            BatchPhase::Joining,
            "completion observed outside join phase",
        )?;
        if self.completed == self.total {
            return Err(self.invalid(format!("more than {} completions", self.total)));
        }
        self.completed += 1;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        self.expect_phase(BatchPhase::Joining, "only a joining batch can complete")?;
        if self.completed != self.total {
            return Err(self.invalid(format!(
                "completed with {} of {} tasks joined",
                self.completed, self.total
            )));
        }
        self.enter(BatchPhase::Complete);
        Ok(())
    }

    fn enter(&mut self, next: BatchPhase) {
        debug!(from = ?self.phase, to = ?next, "batch phase transition");
        self.phase = next;
    }

    fn expect_phase(&self, expected: BatchPhase, reason: &str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(reason.to_string()))
        }
    }

    fn invalid(&self, reason: String) -> HarnessError {
        HarnessError::InvalidTransition {
            from: self.phase,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_happy_path() {
        let mut state = BatchState::new(2);
        assert_eq!(state.phase(), BatchPhase::Idle);

        state.begin_dispatch().unwrap();
        state.record_dispatch().unwrap();
        state.record_dispatch().unwrap();
        state.begin_join().unwrap();
        assert_eq!(state.phase(), BatchPhase::Joining);

        state.record_completion().unwrap();
        state.record_completion().unwrap();
        state.complete().unwrap();
        assert_eq!(state.phase(), BatchPhase::Complete);
        assert_eq!((state.dispatched(), state.completed()), (2, 2));
    }

    #[test]
    fn cannot_join_before_everything_is_dispatched() {
        let mut state = BatchState::new(3);
        state.begin_dispatch().unwrap();
        state.record_dispatch().unwrap();

        let err = state.begin_join().unwrap_err();
        assert!(matches!(
            err,
            HarnessError::InvalidTransition {
                from: BatchPhase::Dispatching,
                ..
            }
        ));
    }

    #[test]
    fn cannot_complete_with_missing_tasks() {
        let mut state = BatchState::new(2);
        state.begin_dispatch().unwrap();
        state.record_dispatch().unwrap();
        state.record_dispatch().unwrap();
        state.begin_join().unwrap();
        state.record_completion().unwrap();

        assert!(state.complete().is_err());
        assert_eq!(state.phase(), BatchPhase::Joining);
    }

    #[test]
    fn rejects_extra_dispatches_and_restarts() {
        let mut state = BatchState::new(1);
        assert!(state.record_dispatch().is_err());

        state.begin_dispatch().unwrap();
        state.record_dispatch().unwrap();
        assert!(state.record_dispatch().is_err());
        assert!(state.begin_dispatch().is_err());
    }

    #[test]
    fn empty_batch_can_complete_immediately() {
        let mut state = BatchState::new(0);
        state.begin_dispatch().unwrap();
        state.begin_join().unwrap();
        state.complete().unwrap();
        assert_eq!(state.phase(), BatchPhase::Complete);
    }
}
