// src/carrier/single.rs

use std::future::Future;
use std::rc::Rc;

use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use tracing::debug;

use crate::errors::Result;

use super::{Carrier, CarrierPool, OccupancyGauge, Requeue, TaskJob, run_seated};

/// The caller's own carrier, used as a pool of one.
///
/// Jobs are spawned onto a `LocalSet` and only make progress while the caller
/// is inside [`CarrierPool::drive`], so the caller's thread *is* the carrier.
/// Anything a task writes to the cell is visible to the caller afterwards.
pub struct SingleCarrierPool {
    carrier: Rc<Carrier>,
    gauge: OccupancyGauge,
    local: LocalSet,
}

impl SingleCarrierPool {
    pub fn new(name: &str) -> Self {
        let gauge = OccupancyGauge::new();
        let carrier = Rc::new(Carrier::new(name, gauge.clone(), Requeue::Local));
        Self {
            carrier,
            gauge,
            local: LocalSet::new(),
        }
    }

    pub fn carrier(&self) -> &Rc<Carrier> {
        &self.carrier
    }
}

impl CarrierPool for SingleCarrierPool {
    fn name(&self) -> &str {
        self.carrier.name()
    }

    fn capacity(&self) -> usize {
        1
    }

    fn gauge(&self) -> &OccupancyGauge {
        &self.gauge
    }

    fn submit(&self, job: TaskJob) -> Result<()> {
        let carrier = Rc::clone(&self.carrier);
        debug!(carrier = %carrier.name(), "queueing job on caller carrier");

        self.local.spawn_local(run_seated(carrier, job));
        Ok(())
    }

    fn drive<F: Future>(&self, rt: &Runtime, until: F) -> F::Output {
        rt.block_on(self.local.run_until(until))
    }
}
