//! Ready-made harnesses for tests: silent reporter, short time units.

use std::time::Duration;

use carrierlab::harness::{Harness, HarnessOptions};
use carrierlab::report::Reporter;
use carrierlab::strategy::PoolSizes;
use carrierlab::wait::WaitPlan;

/// Default time unit for tests.
pub const TEST_UNIT: Duration = Duration::from_millis(5);

/// Harness with random 1..=4 unit waits (seeded) and the given pool sizes.
pub fn quiet_harness(bounded: usize, wide: usize, seed: u64) -> Harness {
    harness_with_plan(bounded, wide, WaitPlan::new(TEST_UNIT, 1, 4, Some(seed)))
}

/// Harness where every wait is exactly `units` test units long.
pub fn fixed_wait_harness(bounded: usize, units: u32) -> Harness {
    harness_with_plan(bounded, 64, WaitPlan::fixed(TEST_UNIT, units))
}

pub fn harness_with_plan(bounded: usize, wide: usize, plan: WaitPlan) -> Harness {
    Harness::new(HarnessOptions {
        pool_sizes: PoolSizes { bounded, wide },
        wait_plan: plan,
        reporter: Reporter::Silent,
    })
    .expect("failed to start test harness")
}
