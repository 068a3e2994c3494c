// src/engine/hazard.rs

//! What a task found in its carrier's cell on entry.

use crate::carrier::UNSET_MARKER;
use crate::task::marker_task_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The caller's marker from before the batch.
    Inherited,
    /// Another task's marker, left behind on a reused carrier.
    Bleed { from: usize },
    /// The unset sentinel: the task landed on a carrier nobody ever wrote to.
    Loss,
    /// Anything else (e.g. a marker a library caller set on a worker).
    Foreign,
}

/// Classify an observed entry marker against the caller's pre-batch marker.
///
/// The caller's marker wins over a task-marker match, so a second batch that
/// starts from a leaked `work-N` still counts its first read as inherited.
pub fn classify(observed: &str, caller_marker: &str) -> Observation {
    if observed == UNSET_MARKER {
        Observation::Loss
    } else if observed == caller_marker {
        Observation::Inherited
    } else if let Some(from) = marker_task_index(observed) {
        Observation::Bleed { from }
    } else {
        Observation::Foreign
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HazardSummary {
    pub inherited: usize,
    pub bleed: usize,
    pub loss: usize,
    pub foreign: usize,
}

impl HazardSummary {
    pub fn tally(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut summary = Self::default();
        for obs in observations {
            match obs {
                Observation::Inherited => summary.inherited += 1,
                Observation::Bleed { .. } => summary.bleed += 1,
                Observation::Loss => summary.loss += 1,
                Observation::Foreign => summary.foreign += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_loss_even_if_caller_is_unset() {
        assert_eq!(classify(UNSET_MARKER, UNSET_MARKER), Observation::Loss);
    }

    #[test]
    fn caller_marker_beats_task_marker() {
        assert_eq!(classify("work-3", "work-3"), Observation::Inherited);
        assert_eq!(classify("work-3", "Main"), Observation::Bleed { from: 3 });
        assert_eq!(classify("Main", "Main"), Observation::Inherited);
        assert_eq!(classify("tx-42", "Main"), Observation::Foreign);
    }

    #[test]
    fn tally_counts_each_kind() {
        let summary = HazardSummary::tally([
            Observation::Inherited,
            Observation::Bleed { from: 1 },
            Observation::Bleed { from: 2 },
            Observation::Loss,
        ]);
        assert_eq!(
            summary,
            HazardSummary {
                inherited: 1,
                bleed: 2,
                loss: 1,
                foreign: 0,
            }
        );
    }
}
