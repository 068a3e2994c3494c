// src/carrier/mod.rs

//! Carriers and carrier pools.
//!
//! A [`Carrier`] is an execution context that runs task bodies one at a time:
//! the caller's own thread, or one worker thread of a [`BoundedPool`]. It
//! owns exactly one [`ContextCell`], which is how ambient context is modelled
//! here: explicitly, as a field, rather than through thread-locals.
//!
//! - [`cell`] is the per-carrier marker slot.
//! - [`occupancy`] tracks which carriers are held by a task.
//! - [`pool`] is the `CarrierPool` trait and the job type both pools run.
//!   A task that gives its carrier up hands the rest of its work back to the
//!   pool through [`Carrier::requeue`], so it may finish on another carrier.
//! - [`single`] is the caller's carrier used as a pool of one.
//! - [`bounded`] is a fixed set of worker carriers on their own threads.

pub mod bounded;
pub mod cell;
pub mod occupancy;
pub mod pool;
pub mod single;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, mpsc};

use crate::errors::{HarnessError, Result};

pub use bounded::BoundedPool;
pub use cell::{ContextCell, UNSET_MARKER};
pub use occupancy::{Occupancy, OccupancyGauge, Reservation};
pub use pool::{CarrierPool, JobFuture, TaskJob};
pub use single::SingleCarrierPool;

pub(crate) use pool::run_seated;

static NEXT_CARRIER_ID: AtomicUsize = AtomicUsize::new(0);

/// Process-unique carrier identity, used to observe carrier reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarrierId(usize);

impl CarrierId {
    fn next() -> Self {
        CarrierId(NEXT_CARRIER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carrier-{}", self.0)
    }
}

/// Where a carrier sends work that has to go back through its pool.
pub(crate) enum Requeue {
    /// The carrier is the whole pool: spawn next to the running task.
    Local,
    /// The shared queue of a bounded pool. Weak, so the workers do not keep
    /// their own pool's queue open.
    Shared(mpsc::WeakUnboundedSender<TaskJob>),
}

/// One execution carrier.
///
/// Carriers are single-occupancy: the seat semaphore has one permit, and a
/// task must hold it (as an [`Occupancy`]) to run on the carrier.
pub struct Carrier {
    id: CarrierId,
    name: String,
    cell: ContextCell,
    seat: Arc<Semaphore>,
    gauge: OccupancyGauge,
    requeue: Requeue,
}

impl fmt::Debug for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carrier")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}

impl Carrier {
    pub(crate) fn new(name: impl Into<String>, gauge: OccupancyGauge, requeue: Requeue) -> Self {
        Self {
            id: CarrierId::next(),
            name: name.into(),
            cell: ContextCell::new(),
            seat: Arc::new(Semaphore::new(1)),
            gauge,
            requeue,
        }
    }

    pub fn id(&self) -> CarrierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self) -> &ContextCell {
        &self.cell
    }

    /// Wait until the carrier's seat is free and reserve it.
    pub async fn reserve(&self) -> Result<Reservation> {
        let permit = Arc::clone(&self.seat).acquire_owned().await.map_err(|_| {
            HarnessError::PoolShutDown(format!("seat of {} was closed", self.name))
        })?;
        Ok(Reservation::new(permit, self.gauge.clone()))
    }

    /// Reserve the seat and immediately count it as occupied.
    pub async fn occupy(&self) -> Result<Occupancy> {
        Ok(self.reserve().await?.occupy())
    }

    /// Hand `job` back to this carrier's pool. It runs on whichever carrier
    /// of the pool is free next, which need not be this one.
    ///
    /// Must be called from a task running on this carrier.
    pub fn requeue(self: Rc<Self>, job: TaskJob) -> Result<()> {
        match &self.requeue {
            Requeue::Local => {
                tokio::task::spawn_local(run_seated(Rc::clone(&self), job));
                Ok(())
            }
            Requeue::Shared(queue) => {
                let gone = || HarnessError::PoolShutDown(format!("pool of {} is gone", self.name));
                let queue = queue.upgrade().ok_or_else(gone)?;
                queue.send(job).map_err(|_| gone())
            }
        }
    }
}
