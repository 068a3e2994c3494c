// src/task.rs

//! The task body every strategy runs.
//!
//! A task, once it holds a carrier:
//! 1. reads the carrier's cell (the marker it "inherited"),
//! 2. overwrites it with its own marker,
//! 3. waits the way its strategy says,
//! 4. reads the cell again and reports.
//!
//! Steps 3 and 4 of a cooperative task are two jobs: the carrier is given up
//! for the wait, and the rest of the task goes back to the pool and resumes on
//! whatever carrier it is handed. Nothing here resets a cell; bleed and loss
//! are left visible on purpose.

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::carrier::{Carrier, CarrierId, JobFuture, Occupancy, TaskJob};
use crate::errors::Result;
use crate::report::Reporter;
use crate::strategy::WaitMode;
use crate::wait::{self, PlannedWait};

pub const TASK_MARKER_PREFIX: &str = "work-";

pub fn task_marker(index: usize) -> String {
    format!("{TASK_MARKER_PREFIX}{index}")
}

pub fn task_result(index: usize) -> String {
    format!("Result of {index}")
}

/// Inverse of [`task_marker`].
pub fn marker_task_index(marker: &str) -> Option<usize> {
    marker.strip_prefix(TASK_MARKER_PREFIX)?.parse().ok()
}

/// Everything a task needs to know before it lands on a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// 1-based position in the batch.
    pub index: usize,
    pub mode: WaitMode,
    pub wait: PlannedWait,
}

/// What one task saw and produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub index: usize,
    pub result: String,
    /// Cell value read before the task wrote its own marker.
    pub observed_entry_marker: String,
    /// Cell value read after the wait, on the carrier the task finished on.
    pub marker_at_resume: String,
    pub wait: PlannedWait,
    pub started_on: CarrierId,
    pub finished_on: CarrierId,
    /// 1-based position in the batch's completion order.
    pub completion_rank: usize,
}

/// Hands out completion ranks within one batch.
#[derive(Debug, Clone, Default)]
pub struct CompletionClock {
    finished: Arc<AtomicUsize>,
}

impl CompletionClock {
    pub fn tick(&self) -> usize {
        self.finished.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Where a task's record goes once it is finished.
///
/// Dropping a `TaskFinish` without finishing is how an aborted task shows up
/// on the receiving side.
pub struct TaskFinish {
    clock: CompletionClock,
    reporter: Reporter,
    deliver: Box<dyn FnOnce(TaskRecord) + Send>,
}

impl TaskFinish {
    pub fn new(
        clock: CompletionClock,
        reporter: Reporter,
        deliver: impl FnOnce(TaskRecord) + Send + 'static,
    ) -> Self {
        Self {
            clock,
            reporter,
            deliver: Box::new(deliver),
        }
    }

    fn finish(self, entry: Entry, carrier: &Carrier, seat: Occupancy) {
        let record = TaskRecord {
            index: entry.spec.index,
            result: task_result(entry.spec.index),
            observed_entry_marker: entry.observed,
            marker_at_resume: carrier.cell().get(),
            wait: entry.spec.wait,
            started_on: entry.started_on,
            finished_on: carrier.id(),
            completion_rank: self.clock.tick(),
        };

        self.reporter.task_finished(&record);
        drop(seat);
        (self.deliver)(record);
    }
}

/// The part of a task that outlives the carrier it started on.
struct Entry {
    spec: TaskSpec,
    observed: String,
    started_on: CarrierId,
}

/// Wrap a task as a pool job. A failing body is logged and its record
/// never delivered.
pub fn task_job(spec: TaskSpec, finish: TaskFinish) -> TaskJob {
    Box::new(move |carrier: Rc<Carrier>, seat: Occupancy| -> JobFuture {
        Box::pin(async move {
            if let Err(e) = run_task(spec, carrier, seat, finish).await {
                warn!(task = spec.index, error = %e, "task body failed");
            }
        })
    })
}

pub async fn run_task(
    spec: TaskSpec,
    carrier: Rc<Carrier>,
    seat: Occupancy,
    finish: TaskFinish,
) -> Result<()> {
    let entry = Entry {
        spec,
        observed: carrier.cell().get(),
        started_on: carrier.id(),
    };
    carrier.cell().set(task_marker(spec.index));

    debug!(
        task = spec.index,
        carrier = %carrier.name(),
        observed = %entry.observed,
        mode = ?spec.mode,
        units = spec.wait.units,
        "task entered carrier"
    );

    match spec.mode {
        WaitMode::Blocking => {
            wait::blocking_wait(spec.wait.duration);
            finish.finish(entry, &carrier, seat);
        }
        WaitMode::FakeSuspend => {
            wait::fake_suspend_wait(spec.wait.duration).await;
            finish.finish(entry, &carrier, seat);
        }
        WaitMode::Cooperative => {
            drop(seat);
            wait::cooperative_wait(spec.wait.duration).await;

            let resume = move |carrier: Rc<Carrier>, seat: Occupancy| -> JobFuture {
                Box::pin(async move {
                    debug!(task = spec.index, carrier = %carrier.name(), "task resumed");
                    finish.finish(entry, &carrier, seat);
                })
            };
            carrier.requeue(Box::new(resume))?;
        }
    }

    Ok(())
}
