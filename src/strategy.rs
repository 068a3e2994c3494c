// src/strategy.rs

//! Scheduling strategies.
//!
//! A strategy fixes three things for the lifetime of one batch:
//! - which carrier pool the tasks are dispatched to ([`PoolKind`])
//! - how a task waits once it holds a carrier ([`WaitMode`])
//! - whether the batch keeps a result handle per task or launches them
//!   fire-and-forget ([`Dispatch`])
//!
//! The six named scenarios are presets ([`Strategy::preset`]); any other
//! combination can be built with [`Strategy::custom`].

use std::fmt;
use std::num::NonZeroUsize;

use crate::types::StrategyKind;

/// Default size of the wide pool (mirrors a typical IO dispatcher).
pub const DEFAULT_WIDE_POOL_SIZE: usize = 64;

/// Which carriers a batch is dispatched onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// The caller's own carrier. Everything the batch does runs on it.
    SingleCarrier,
    /// A pool of `capacity` worker carriers, separate from the caller.
    Bounded { capacity: usize },
}

/// How a task waits after it has written its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitMode {
    /// Holds the carrier for the whole wait.
    Blocking,
    /// Gives the carrier back while waiting and re-occupies it afterwards.
    Cooperative,
    /// Looks like a suspension point from the outside (it is awaited), but
    /// blocks the carrier underneath.
    FakeSuspend,
}

/// How tasks are handed to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// One result handle per task; the runner awaits them in index order.
    Await,
    /// No handles; the runner joins on the batch scope instead.
    Launch,
}

/// Capacities used when resolving the pooled presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSizes {
    pub bounded: usize,
    pub wide: usize,
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            bounded: default_parallelism(),
            wide: DEFAULT_WIDE_POOL_SIZE,
        }
    }
}

/// Number of logical cores, falling back to 4 when it cannot be queried.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4)
}

/// A fully resolved scheduling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    /// The named scenario this came from, if any.
    pub kind: Option<StrategyKind>,
    pub pool: PoolKind,
    pub wait: WaitMode,
    pub dispatch: Dispatch,
}

impl Strategy {
    pub fn preset(kind: StrategyKind, sizes: PoolSizes) -> Self {
        let (pool, wait, dispatch) = match kind {
            StrategyKind::Naive => (PoolKind::SingleCarrier, WaitMode::Blocking, Dispatch::Await),
            StrategyKind::Correct => (
                PoolKind::SingleCarrier,
                WaitMode::Cooperative,
                Dispatch::Await,
            ),
            StrategyKind::FakeSuspend => (
                PoolKind::SingleCarrier,
                WaitMode::FakeSuspend,
                Dispatch::Await,
            ),
            StrategyKind::QuickfixBounded => (
                PoolKind::Bounded {
                    capacity: sizes.bounded,
                },
                WaitMode::Blocking,
                Dispatch::Await,
            ),
            StrategyKind::QuickfixWide => (
                PoolKind::Bounded {
                    capacity: sizes.wide,
                },
                WaitMode::Blocking,
                Dispatch::Await,
            ),
            StrategyKind::FireAndForget => (
                PoolKind::SingleCarrier,
                WaitMode::Blocking,
                Dispatch::Launch,
            ),
        };

        Self {
            kind: Some(kind),
            pool,
            wait,
            dispatch,
        }
    }

    pub fn custom(pool: PoolKind, wait: WaitMode, dispatch: Dispatch) -> Self {
        Self {
            kind: None,
            pool,
            wait,
            dispatch,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.kind {
            write!(f, "S{} {}", kind.number(), kind)?;
        } else {
            f.write_str("custom")?;
        }
        let pool = match self.pool {
            PoolKind::SingleCarrier => "single carrier".to_string(),
            PoolKind::Bounded { capacity } => format!("pool of {capacity}"),
        };
        write!(f, " ({pool}, {:?} wait, {:?})", self.wait, self.dispatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> PoolSizes {
        PoolSizes {
            bounded: 4,
            wide: 64,
        }
    }

    #[test]
    fn single_carrier_presets_stay_on_the_caller() {
        for kind in [
            StrategyKind::Naive,
            StrategyKind::Correct,
            StrategyKind::FakeSuspend,
            StrategyKind::FireAndForget,
        ] {
            let s = Strategy::preset(kind, sizes());
            assert_eq!(s.pool, PoolKind::SingleCarrier);
        }
    }

    #[test]
    fn only_correct_waits_cooperatively() {
        for kind in StrategyKind::ALL {
            let s = Strategy::preset(kind, sizes());
            assert_eq!(s.wait == WaitMode::Cooperative, kind == StrategyKind::Correct);
        }
        let s = Strategy::preset(StrategyKind::FakeSuspend, sizes());
        assert_eq!(s.wait, WaitMode::FakeSuspend);
    }

    #[test]
    fn pooled_presets_take_their_capacity_from_sizes() {
        let bounded = Strategy::preset(StrategyKind::QuickfixBounded, sizes());
        let wide = Strategy::preset(StrategyKind::QuickfixWide, sizes());
        assert_eq!(bounded.pool, PoolKind::Bounded { capacity: 4 });
        assert_eq!(wide.pool, PoolKind::Bounded { capacity: 64 });
        assert_eq!(bounded.wait, WaitMode::Blocking);
    }

    #[test]
    fn only_fire_and_forget_launches() {
        for kind in StrategyKind::ALL {
            let s = Strategy::preset(kind, sizes());
            let launches = s.dispatch == Dispatch::Launch;
            assert_eq!(launches, kind == StrategyKind::FireAndForget);
        }
    }
}
