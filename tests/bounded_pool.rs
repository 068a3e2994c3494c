// tests/bounded_pool.rs

mod common;
use crate::common::{expected_results, init_tracing, result_set};

use std::collections::BTreeSet;
use std::time::Duration;

use carrierlab::carrier::UNSET_MARKER;
use carrierlab::engine::Observation;
use carrierlab::types::StrategyKind;
use carrierlab::wait::WaitPlan;
use carrierlab_test_utils::harness::{harness_with_plan, quiet_harness};
use carrierlab_test_utils::with_deadline;

#[test]
fn ten_tasks_on_a_fresh_pool_of_four() {
    init_tracing();

    let outcome = with_deadline(10, || {
        let mut harness = quiet_harness(4, 64, 42);
        harness.set_ambient("Main");
        let strategy = harness.strategy(StrategyKind::QuickfixBounded);
        harness.run_batch(10, strategy).unwrap()
    });

    assert!(outcome.peak_occupancy >= 1);
    assert!(
        outcome.peak_occupancy <= 4,
        "{} tasks held a carrier at once",
        outcome.peak_occupancy
    );
    assert_eq!(outcome.capacity, 4);
    assert_eq!(outcome.records.len(), 10);
    assert_eq!(result_set(&outcome), expected_results(10));

    // Context loss: at least the first task landed on a never-used carrier.
    assert!(outcome.observed_markers().any(|m| m == UNSET_MARKER));
    // The caller's own carrier was never touched.
    assert_eq!(outcome.final_marker, "Main");
}

#[test]
fn loss_and_bleed_follow_carrier_reuse() {
    let outcome = with_deadline(10, || {
        let mut harness = quiet_harness(4, 64, 8);
        harness.set_ambient("Main");
        let strategy = harness.strategy(StrategyKind::QuickfixBounded);
        harness.run_batch(10, strategy).unwrap()
    });

    // Each carrier's first task sees the sentinel; every later task on it sees
    // the marker of the task that ran there before.
    let carriers: BTreeSet<_> = outcome.records.iter().map(|r| r.started_on).collect();
    let hazards = outcome.hazards();
    assert!(carriers.len() <= 4);
    assert_eq!(hazards.loss, carriers.len());
    assert_eq!(hazards.bleed, 10 - carriers.len());
    assert_eq!(hazards.inherited, 0);

    for index in 1..=10 {
        let obs = outcome.observation(index).unwrap();
        assert!(matches!(obs, Observation::Loss | Observation::Bleed { .. }));
    }
}

#[test]
fn blocking_waits_are_bounded_by_pool_size() {
    // 8 tasks x 4 units x 10ms on 4 carriers: at least two rounds of 40ms,
    // well under the 320ms a single carrier would need.
    let outcome = with_deadline(10, || {
        let mut harness = harness_with_plan(4, 64, WaitPlan::fixed(Duration::from_millis(10), 4));
        let strategy = harness.strategy(StrategyKind::QuickfixBounded);
        harness.run_batch(8, strategy).unwrap()
    });

    assert!(outcome.elapsed >= Duration::from_millis(80));
    assert!(outcome.elapsed < outcome.total_wait);
    assert!(outcome.peak_occupancy <= 4);
}

#[test]
fn wide_pool_uses_its_own_capacity() {
    let outcome = with_deadline(10, || {
        let mut harness = quiet_harness(2, 16, 4);
        harness.set_ambient("Main");
        let strategy = harness.strategy(StrategyKind::QuickfixWide);
        harness.run_batch(40, strategy).unwrap()
    });

    assert_eq!(outcome.capacity, 16);
    assert!(outcome.peak_occupancy <= 16);
    assert!(outcome.hazards().loss >= 1);
    assert_eq!(result_set(&outcome), expected_results(40));
}

#[test]
fn pools_and_their_cells_survive_across_batches() {
    let (pools, first, second) = with_deadline(10, || {
        let mut harness = quiet_harness(3, 64, 12);
        let strategy = harness.strategy(StrategyKind::QuickfixBounded);
        let first = harness.run_batch(9, strategy).unwrap();
        let second = harness.run_batch(9, strategy).unwrap();
        (harness.started_pools(), first, second)
    });

    assert_eq!(pools, vec![3]);

    let first_carriers: BTreeSet<_> = first.records.iter().map(|r| r.started_on).collect();
    let all_carriers: BTreeSet<_> = first
        .records
        .iter()
        .chain(second.records.iter())
        .map(|r| r.started_on)
        .collect();
    assert!(all_carriers.len() <= 3);

    // A carrier already used in the first batch hands its leftover marker to
    // its first task of the second batch.
    for record in &second.records {
        if first_carriers.contains(&record.started_on) {
            assert_ne!(record.observed_entry_marker, UNSET_MARKER);
        }
    }
}
