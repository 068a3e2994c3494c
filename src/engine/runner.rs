// src/engine/runner.rs

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use tracing::{debug, info, info_span, warn};

use crate::carrier::{Carrier, CarrierPool};
use crate::errors::{HarnessError, Result};
use crate::report::Reporter;
use crate::strategy::{Dispatch, Strategy};
use crate::task::{CompletionClock, TaskFinish, TaskRecord, TaskSpec, task_job};
use crate::wait::WaitPlan;

use super::BatchOutcome;
use super::scope::BatchScope;
use super::state::{BatchPhase, BatchState};

/// What a batch borrows from its harness while it runs.
pub struct BatchContext<'a> {
    /// Runtime of the caller's thread.
    pub rt: &'a Runtime,
    /// The caller's carrier; its cell is the "ambient marker as seen by the
    /// original caller".
    pub caller: &'a Carrier,
    pub plan: &'a mut WaitPlan,
    pub reporter: Reporter,
}

/// Fans one batch of N tasks out to a carrier pool and joins them.
///
/// The runner never returns before every dispatched task has reported back
/// (or been found aborted), whatever the wait mode or dispatch style.
#[derive(Debug)]
pub struct BatchRunner {
    strategy: Strategy,
    tasks: usize,
    state: BatchState,
}

impl BatchRunner {
    pub fn new(tasks: usize, strategy: Strategy) -> Self {
        Self {
            strategy,
            tasks,
            state: BatchState::new(tasks),
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn tasks(&self) -> usize {
        self.tasks
    }

    pub fn phase(&self) -> BatchPhase {
        self.state.phase()
    }

    pub fn run<P: CarrierPool>(&mut self, pool: &P, ctx: BatchContext<'_>) -> Result<BatchOutcome> {
        let span = info_span!("batch", strategy = %self.strategy, tasks = self.tasks);
        let _entered = span.enter();

        let initial_marker = ctx.caller.cell().get();
        info!(
            pool = pool.name(),
            capacity = pool.capacity(),
            initial = %initial_marker,
            "batch starting"
        );

        pool.gauge().reset_peak();
        let started = Instant::now();
        self.state.begin_dispatch()?;

        let specs: Vec<TaskSpec> = (1..=self.tasks)
            .map(|index| TaskSpec {
                index,
                mode: self.strategy.wait,
                wait: ctx.plan.next_wait(),
            })
            .collect();
        let total_wait: Duration = specs.iter().map(|s| s.wait.duration).sum();
        let clock = CompletionClock::default();

        let records = match self.strategy.dispatch {
            Dispatch::Await => {
                self.dispatch_awaiting(pool, ctx.rt, specs, &clock, ctx.reporter)?
            }
            Dispatch::Launch => {
                self.dispatch_launched(pool, ctx.rt, specs, &clock, ctx.reporter)?
            }
        };
        self.state.complete()?;

        let outcome = BatchOutcome {
            strategy: self.strategy,
            initial_marker,
            records,
            final_marker: ctx.caller.cell().get(),
            elapsed: started.elapsed(),
            total_wait,
            peak_occupancy: pool.gauge().peak(),
            capacity: pool.capacity(),
        };

        info!(
            elapsed = ?outcome.elapsed,
            total_wait = ?outcome.total_wait,
            peak = outcome.peak_occupancy,
            final_marker = %outcome.final_marker,
            "batch complete"
        );

        Ok(outcome)
    }

    /// One result handle per task, awaited in index order.
    fn dispatch_awaiting<P: CarrierPool>(
        &mut self,
        pool: &P,
        rt: &Runtime,
        specs: Vec<TaskSpec>,
        clock: &CompletionClock,
        reporter: Reporter,
    ) -> Result<Vec<TaskRecord>> {
        let mut handles = Vec::with_capacity(specs.len());

        for spec in specs {
            let (tx, rx) = oneshot::channel::<TaskRecord>();
            let finish = TaskFinish::new(clock.clone(), reporter, move |record| {
                // The receiver only goes away if the runner itself failed.
                let _ = tx.send(record);
            });

            pool.submit(task_job(spec, finish))?;
            self.state.record_dispatch()?;
            debug!(task = spec.index, "task dispatched with result handle");
            handles.push((spec.index, rx));
        }

        self.state.begin_join()?;
        let state = &mut self.state;

        pool.drive(rt, async move {
            let mut records = Vec::with_capacity(handles.len());
            for (index, rx) in handles {
                let record = rx.await.map_err(|_| HarnessError::TaskAborted { index })?;
                state.record_completion()?;
                records.push(record);
            }
            Ok::<_, HarnessError>(records)
        })
    }

    /// No handles: each job drops its record into a slot and the runner joins
    /// on the batch scope.
    fn dispatch_launched<P: CarrierPool>(
        &mut self,
        pool: &P,
        rt: &Runtime,
        specs: Vec<TaskSpec>,
        clock: &CompletionClock,
        reporter: Reporter,
    ) -> Result<Vec<TaskRecord>> {
        let slots: Arc<Mutex<Vec<Option<TaskRecord>>>> =
            Arc::new(Mutex::new(vec![None; specs.len()]));
        let scope = BatchScope::new();

        for spec in specs {
            let token = scope.token();
            let slots = Arc::clone(&slots);
            let index = spec.index;
            let finish = TaskFinish::new(clock.clone(), reporter, move |record| {
                let _token = token;
                match slots.lock() {
                    Ok(mut slots) => slots[index - 1] = Some(record),
                    Err(_) => warn!(task = index, "result slots poisoned; dropping record"),
                }
            });

            pool.submit(task_job(spec, finish))?;
            self.state.record_dispatch()?;
            debug!(task = spec.index, "task launched");
        }

        self.state.begin_join()?;
        pool.drive(rt, scope.join());

        let mut slots = slots
            .lock()
            .map_err(|_| anyhow!("launched task result slots poisoned"))?;
        let mut records = Vec::with_capacity(slots.len());
        for (i, slot) in slots.iter_mut().enumerate() {
            let record = slot.take().ok_or(HarnessError::TaskAborted { index: i + 1 })?;
            self.state.record_completion()?;
            records.push(record);
        }

        Ok(records)
    }
}
