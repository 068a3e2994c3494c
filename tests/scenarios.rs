// tests/scenarios.rs

mod common;
use crate::common::{assert_strict_chain, expected_results, init_tracing, result_set};

use carrierlab::run_scenario;
use carrierlab::types::StrategyKind;
use carrierlab_test_utils::builders::HarnessConfigBuilder;
use carrierlab_test_utils::harness::quiet_harness;
use carrierlab_test_utils::with_deadline;

#[test]
fn all_six_scenarios_in_order_reset_the_callers_marker() {
    init_tracing();

    let outcomes = with_deadline(30, || {
        let cfg = HarnessConfigBuilder::new()
            .tasks(4)
            .pooled_tasks(12)
            .bounded_size(3)
            .wide_size(8)
            .waits(2, 1, 4, 17)
            .build();
        let mut harness = quiet_harness(3, 8, 17);

        StrategyKind::ALL
            .iter()
            .map(|&kind| (kind, run_scenario(&mut harness, &cfg, kind).unwrap()))
            .collect::<Vec<_>>()
    });

    for (kind, outcome) in &outcomes {
        assert_eq!(outcome.initial_marker, "Main", "{kind} did not start from Main");

        if kind.uses_bounded_pool() {
            assert_eq!(outcome.records.len(), 12);
            assert_eq!(result_set(outcome), expected_results(12));
            // Work ran elsewhere; the caller keeps its marker.
            assert_eq!(outcome.final_marker, "Main");
        } else {
            assert_eq!(result_set(outcome), expected_results(4));
            assert_strict_chain(outcome, "Main");
        }
    }
}
