// src/harness.rs

//! The harness: the caller's carrier plus every pool a batch can run on.
//!
//! Carriers outlive batches. The caller's carrier is the single-carrier pool
//! (an inherited dispatcher with one thread), and bounded pools are created
//! the first time a strategy asks for a given capacity and reused after that,
//! cell contents included. Dropping the harness stops and joins every worker
//! carrier.

use std::collections::BTreeMap;

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::carrier::{BoundedPool, Carrier, SingleCarrierPool};
use crate::engine::{BatchContext, BatchOutcome, BatchRunner};
use crate::errors::Result;
use crate::report::Reporter;
use crate::strategy::{PoolKind, PoolSizes, Strategy};
use crate::types::StrategyKind;
use crate::wait::WaitPlan;

#[derive(Debug)]
pub struct HarnessOptions {
    pub pool_sizes: PoolSizes,
    pub wait_plan: WaitPlan,
    pub reporter: Reporter,
}

pub struct Harness {
    // Field order is drop order: pools go before the caller's runtime.
    single: SingleCarrierPool,
    bounded: BTreeMap<usize, BoundedPool>,
    pool_sizes: PoolSizes,
    plan: WaitPlan,
    reporter: Reporter,
    rt: Runtime,
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("caller", self.single.carrier())
            .field("bounded", &self.bounded)
            .field("pool_sizes", &self.pool_sizes)
            .finish_non_exhaustive()
    }
}

impl Harness {
    /// Must be called outside of any Tokio runtime: the calling thread
    /// becomes the caller's carrier and is blocked on while batches run.
    pub fn new(options: HarnessOptions) -> Result<Self> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            single: SingleCarrierPool::new("main"),
            bounded: BTreeMap::new(),
            pool_sizes: options.pool_sizes,
            plan: options.wait_plan,
            reporter: options.reporter,
            rt,
        })
    }

    pub fn caller_carrier(&self) -> &Carrier {
        self.single.carrier()
    }

    /// The caller's ambient marker.
    pub fn ambient(&self) -> String {
        self.caller_carrier().cell().get()
    }

    pub fn set_ambient(&self, marker: impl Into<String>) {
        self.caller_carrier().cell().set(marker);
    }

    pub fn pool_sizes(&self) -> PoolSizes {
        self.pool_sizes
    }

    pub fn reporter(&self) -> Reporter {
        self.reporter
    }

    /// Resolve a named scenario with this harness's pool sizes.
    pub fn strategy(&self, kind: StrategyKind) -> Strategy {
        Strategy::preset(kind, self.pool_sizes)
    }

    /// Capacities of the bounded pools started so far.
    pub fn started_pools(&self) -> Vec<usize> {
        self.bounded.keys().copied().collect()
    }

    pub fn run_batch(&mut self, tasks: usize, strategy: Strategy) -> Result<BatchOutcome> {
        let mut runner = BatchRunner::new(tasks, strategy);
        self.run(&mut runner)
    }

    pub fn run(&mut self, runner: &mut BatchRunner) -> Result<BatchOutcome> {
        let ctx = BatchContext {
            rt: &self.rt,
            caller: self.single.carrier(),
            plan: &mut self.plan,
            reporter: self.reporter,
        };

        match runner.strategy().pool {
            PoolKind::SingleCarrier => runner.run(&self.single, ctx),
            PoolKind::Bounded { capacity } => {
                let pool = match self.bounded.entry(capacity) {
                    std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
                    std::collections::btree_map::Entry::Vacant(entry) => {
                        debug!(capacity, "starting bounded pool on first use");
                        entry.insert(BoundedPool::new(&format!("pool{capacity}"), capacity)?)
                    }
                };
                runner.run(&*pool, ctx)
            }
        }
    }
}
