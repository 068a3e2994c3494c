// src/carrier/pool.rs

//! Pluggable carrier pool abstraction.
//!
//! The batch runner talks to a `CarrierPool` instead of a concrete pool, so
//! the same dispatch/join code runs on the caller's single carrier and on a
//! bounded set of worker carriers.
//!
//! Acquire/release is expressed through [`Occupancy`]: the pool reserves a
//! carrier's seat before handing it a job, the job receives the held seat,
//! and dropping it gives the carrier back.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tokio::runtime::Runtime;
use tracing::warn;

use crate::errors::Result;

use super::{Carrier, Occupancy, OccupancyGauge};

/// Future produced by a job once it is placed on a carrier.
///
/// Not `Send`: it stays on the carrier that started it.
pub type JobFuture = Pin<Box<dyn Future<Output = ()>>>;

/// A unit of work waiting for a carrier.
///
/// The job itself is `Send` so it can cross into a worker thread; it is
/// called with the carrier it landed on and the seat it holds there.
pub type TaskJob = Box<dyn FnOnce(Rc<Carrier>, Occupancy) -> JobFuture + Send>;

/// Trait abstracting where task jobs run.
pub trait CarrierPool {
    fn name(&self) -> &str;

    /// Maximum number of jobs that can hold a carrier at the same time.
    fn capacity(&self) -> usize;

    fn gauge(&self) -> &OccupancyGauge;

    /// Hand a job to the pool. Jobs are started in submission order.
    fn submit(&self, job: TaskJob) -> Result<()>;

    /// Block the calling thread on `until`, driving whatever the pool needs
    /// driven on that thread in the meantime.
    fn drive<F: Future>(&self, rt: &Runtime, until: F) -> F::Output;
}

/// Wait for `carrier`'s seat, then run `job` on it.
pub(crate) async fn run_seated(carrier: Rc<Carrier>, job: TaskJob) {
    match carrier.occupy().await {
        Ok(seat) => job(carrier, seat).await,
        Err(e) => warn!(
            carrier = %carrier.name(),
            error = %e,
            "could not occupy carrier; dropping job"
        ),
    }
}
