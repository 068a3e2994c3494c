// src/wait.rs

//! Wait primitives and wait-duration planning.
//!
//! There are exactly two real ways to wait:
//! - [`blocking_wait`] parks the carrier's thread. Nothing else runs on that
//!   carrier until it returns.
//! - [`cooperative_wait`] is a timer future. The task is suspended and the
//!   carrier is free to run other tasks.
//!
//! [`fake_suspend_wait`] is the trap in between: it has to be awaited like
//! the cooperative one, but its body never yields, so it behaves exactly like
//! [`blocking_wait`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub fn blocking_wait(duration: Duration) {
    std::thread::sleep(duration);
}

pub async fn cooperative_wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[allow(clippy::unused_async)]
pub async fn fake_suspend_wait(duration: Duration) {
    std::thread::sleep(duration);
}

/// One planned wait: how many time units, and how long that is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedWait {
    pub units: u32,
    pub duration: Duration,
}

/// Draws pseudo-random wait lengths, `min_units..=max_units` time units each.
///
/// Durations are drawn on the caller's side at dispatch time, so a seeded plan
/// gives the same waits for the same submission order regardless of which
/// carrier a task ends up on.
#[derive(Debug)]
pub struct WaitPlan {
    unit: Duration,
    min_units: u32,
    max_units: u32,
    rng: StdRng,
}

impl WaitPlan {
    /// `max_units` is clamped up to `min_units`.
    pub fn new(unit: Duration, min_units: u32, max_units: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            unit,
            min_units,
            max_units: max_units.max(min_units),
            rng,
        }
    }

    /// Every wait is exactly `units` long.
    pub fn fixed(unit: Duration, units: u32) -> Self {
        Self::new(unit, units, units, Some(0))
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    pub fn next_wait(&mut self) -> PlannedWait {
        let units = if self.min_units == self.max_units {
            self.min_units
        } else {
            self.rng.random_range(self.min_units..=self.max_units)
        };
        PlannedWait {
            units,
            duration: self.unit * units,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::{Future, poll_fn};
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use super::*;

    #[test]
    fn draws_stay_within_bounds() {
        let mut plan = WaitPlan::new(Duration::from_millis(10), 1, 4, Some(7));
        for _ in 0..200 {
            let wait = plan.next_wait();
            assert!((1..=4).contains(&wait.units));
            assert_eq!(wait.duration, Duration::from_millis(10) * wait.units);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = WaitPlan::new(Duration::from_millis(1), 1, 4, Some(42));
        let mut b = WaitPlan::new(Duration::from_millis(1), 1, 4, Some(42));
        let xs: Vec<_> = (0..20).map(|_| a.next_wait()).collect();
        let ys: Vec<_> = (0..20).map(|_| b.next_wait()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        let mut plan = WaitPlan::new(Duration::from_millis(5), 3, 1, None);
        assert_eq!(plan.next_wait().units, 3);
    }

    #[test]
    fn fake_suspend_completes_on_first_poll() {
        let mut fut = pin!(fake_suspend_wait(Duration::from_millis(5)));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(fut.as_mut().poll(&mut cx).is_ready());
    }

    #[test]
    fn cooperative_wait_is_pending_on_first_poll() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let pending = rt.block_on(async {
            let mut fut = pin!(cooperative_wait(Duration::from_millis(20)));
            poll_fn(|cx| Poll::Ready(fut.as_mut().poll(cx).is_pending())).await
        });
        assert!(pending);
    }
}
