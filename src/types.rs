use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The six named scheduling scenarios a batch can be run under.
///
/// Each one is a preset over pool kind x wait mode x dispatch style; see
/// [`crate::strategy::Strategy::preset`] for the exact combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// S1: blocking work on the inherited single carrier.
    #[default]
    Naive,
    /// S2: cooperative waits on the inherited single carrier.
    Correct,
    /// S3: a suspend-capable signature around a blocking wait.
    FakeSuspend,
    /// S4: blocking work moved to a pool sized to the core count.
    QuickfixBounded,
    /// S5: blocking work moved to a wide (64 carrier) pool.
    QuickfixWide,
    /// S6: blocking work launched without result handles.
    FireAndForget,
}

impl StrategyKind {
    /// All scenarios, in the order the demo runs them.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Naive,
        StrategyKind::Correct,
        StrategyKind::FakeSuspend,
        StrategyKind::QuickfixBounded,
        StrategyKind::QuickfixWide,
        StrategyKind::FireAndForget,
    ];

    /// Scenario number as used in reports ("Scenario 4").
    pub fn number(self) -> usize {
        match self {
            StrategyKind::Naive => 1,
            StrategyKind::Correct => 2,
            StrategyKind::FakeSuspend => 3,
            StrategyKind::QuickfixBounded => 4,
            StrategyKind::QuickfixWide => 5,
            StrategyKind::FireAndForget => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Naive => "naive",
            StrategyKind::Correct => "correct",
            StrategyKind::FakeSuspend => "fake-suspend",
            StrategyKind::QuickfixBounded => "quickfix-bounded",
            StrategyKind::QuickfixWide => "quickfix-wide",
            StrategyKind::FireAndForget => "fire-and-forget",
        }
    }

    /// True for the scenarios that move work off the caller's carrier.
    pub fn uses_bounded_pool(self) -> bool {
        matches!(
            self,
            StrategyKind::QuickfixBounded | StrategyKind::QuickfixWide
        )
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "naive" | "s1" | "1" => Ok(StrategyKind::Naive),
            "correct" | "s2" | "2" => Ok(StrategyKind::Correct),
            "fake-suspend" | "s3" | "3" => Ok(StrategyKind::FakeSuspend),
            "quickfix-bounded" | "s4" | "4" => Ok(StrategyKind::QuickfixBounded),
            "quickfix-wide" | "s5" | "5" => Ok(StrategyKind::QuickfixWide),
            "fire-and-forget" | "s6" | "6" => Ok(StrategyKind::FireAndForget),
            other => Err(format!(
                "invalid strategy: {other} (expected one of naive, correct, fake-suspend, \
                 quickfix-bounded, quickfix-wide, fire-and-forget, or s1..s6)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_short_forms() {
        assert_eq!("naive".parse::<StrategyKind>(), Ok(StrategyKind::Naive));
        assert_eq!(" S4 ".parse::<StrategyKind>(), Ok(StrategyKind::QuickfixBounded));
        assert_eq!("6".parse::<StrategyKind>(), Ok(StrategyKind::FireAndForget));
        assert!("eager".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>(), Ok(kind));
        }
    }

    #[test]
    fn numbers_follow_run_order() {
        let numbers: Vec<_> = StrategyKind::ALL.iter().map(|k| k.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }
}
