// src/carrier/bounded.rs

//! A fixed-size pool of worker carriers.
//!
//! Each worker is an OS thread running its own current-thread Tokio runtime
//! and owning one [`Carrier`]. Workers pull jobs from one shared FIFO queue,
//! but only after reserving their own seat, so a job always starts on a
//! carrier that is free. A blocking wait keeps the seat (and the thread) for
//! the whole wait. A cooperative wait gives the seat back; when it ends, the
//! rest of the task goes back on the same queue and resumes on whichever
//! worker takes it.
//!
//! Worker cells start out unset and are never seeded from the caller, which is
//! where the "lost context" observations come from.

use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::{Mutex, mpsc};
use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use crate::errors::{HarnessError, Result};

use super::{Carrier, CarrierPool, OccupancyGauge, Requeue, TaskJob};

type SharedJobQueue = Arc<Mutex<mpsc::UnboundedReceiver<TaskJob>>>;

pub struct BoundedPool {
    name: String,
    capacity: usize,
    gauge: OccupancyGauge,
    job_tx: Option<mpsc::UnboundedSender<TaskJob>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for BoundedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedPool")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("gauge", &self.gauge)
            .finish_non_exhaustive()
    }
}

impl BoundedPool {
    /// Start `capacity` worker carriers named `{name}-{slot}`.
    pub fn new(name: &str, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(HarnessError::ConfigError(format!(
                "carrier pool '{name}' needs a capacity of at least 1"
            )));
        }

        let gauge = OccupancyGauge::new();
        let (job_tx, job_rx) = mpsc::unbounded_channel::<TaskJob>();
        let job_rx: SharedJobQueue = Arc::new(Mutex::new(job_rx));

        let mut workers = Vec::with_capacity(capacity);
        for slot in 0..capacity {
            let worker_name = format!("{name}-{slot}");
            let rt = Builder::new_current_thread().enable_all().build()?;
            let carrier = WorkerCarrier {
                name: worker_name.clone(),
                gauge: gauge.clone(),
                requeue: job_tx.downgrade(),
            };
            let jobs = Arc::clone(&job_rx);

            let handle = thread::Builder::new()
                .name(worker_name)
                .spawn(move || worker_main(carrier, rt, jobs))?;
            workers.push(handle);
        }

        info!(pool = %name, capacity, "bounded carrier pool started");

        Ok(Self {
            name: name.to_string(),
            capacity,
            gauge,
            job_tx: Some(job_tx),
            workers,
        })
    }
}

impl CarrierPool for BoundedPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn gauge(&self) -> &OccupancyGauge {
        &self.gauge
    }

    fn submit(&self, job: TaskJob) -> Result<()> {
        let tx = self
            .job_tx
            .as_ref()
            .ok_or_else(|| HarnessError::PoolShutDown(self.name.clone()))?;
        tx.send(job)
            .map_err(|_| HarnessError::PoolShutDown(self.name.clone()))
    }

    fn drive<F: Future>(&self, rt: &Runtime, until: F) -> F::Output {
        // Workers drive themselves; the caller only waits.
        rt.block_on(until)
    }
}

impl Drop for BoundedPool {
    fn drop(&mut self) {
        // Closing the queue makes every idle worker leave its loop. Jobs still
        // suspended on a worker are dropped with it and surface as aborted.
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!(pool = %self.name, "worker carrier panicked during shutdown");
            }
        }
        debug!(pool = %self.name, "bounded carrier pool shut down");
    }
}

/// What a worker thread needs to build its carrier. The carrier itself is
/// not `Send` and is created on the worker.
struct WorkerCarrier {
    name: String,
    gauge: OccupancyGauge,
    requeue: mpsc::WeakUnboundedSender<TaskJob>,
}

fn worker_main(parts: WorkerCarrier, rt: Runtime, jobs: SharedJobQueue) {
    let carrier = Rc::new(Carrier::new(
        parts.name,
        parts.gauge,
        Requeue::Shared(parts.requeue),
    ));
    let local = LocalSet::new();

    local.block_on(&rt, async move {
        debug!(carrier = %carrier.name(), id = %carrier.id(), "worker carrier started");

        loop {
            // A thread parked inside a blocking wait must not sit on the
            // shared queue, so the seat comes first.
            let seat = match carrier.reserve().await {
                Ok(seat) => seat,
                Err(e) => {
                    warn!(carrier = %carrier.name(), error = %e, "worker lost its seat; exiting");
                    break;
                }
            };

            let next = jobs.lock().await.recv().await;
            let Some(job) = next else {
                break;
            };

            debug!(carrier = %carrier.name(), "worker picked up job");
            tokio::task::spawn_local(job(Rc::clone(&carrier), seat.occupy()));
        }

        debug!(carrier = %carrier.name(), "job queue closed; worker carrier exiting");
    });
}
