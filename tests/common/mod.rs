#![allow(dead_code)]

use std::collections::BTreeSet;

use carrierlab::engine::BatchOutcome;
use carrierlab::task::{task_marker, task_result};

#[allow(unused_imports)]
pub use carrierlab_test_utils::init_tracing;

/// Every `Result of i` for i in 1..=n, as a set.
pub fn expected_results(n: usize) -> BTreeSet<String> {
    (1..=n).map(task_result).collect()
}

pub fn result_set(outcome: &BatchOutcome) -> BTreeSet<String> {
    outcome.results().map(str::to_string).collect()
}

/// Task 1 saw `initial`, task i saw task i-1's marker, and the caller ends
/// up holding the last task's marker.
pub fn assert_strict_chain(outcome: &BatchOutcome, initial: &str) {
    let n = outcome.records.len();
    for record in &outcome.records {
        let expected = if record.index == 1 {
            initial.to_string()
        } else {
            task_marker(record.index - 1)
        };
        assert_eq!(
            record.observed_entry_marker, expected,
            "task {} observed the wrong entry marker",
            record.index
        );
    }
    assert_eq!(outcome.final_marker, task_marker(n));
}
