// src/carrier/occupancy.rs

//! Carrier occupancy tracking.
//!
//! Every carrier has exactly one seat. A task holds an [`Occupancy`] while it
//! runs on a carrier (including during a blocking wait) and drops it during a
//! cooperative wait. The pool-wide [`OccupancyGauge`] counts held seats and
//! remembers the high-water mark so tests can check the pool never had more
//! than `capacity` holders.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::OwnedSemaphorePermit;

#[derive(Debug, Default)]
struct GaugeInner {
    current: AtomicUsize,
    peak: AtomicUsize,
}

/// Shared counter of occupied carriers in one pool.
#[derive(Debug, Clone, Default)]
pub struct OccupancyGauge {
    inner: Arc<GaugeInner>,
}

impl OccupancyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.inner.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }

    /// Start a new measurement window (called at the start of every batch).
    pub fn reset_peak(&self) {
        self.inner.peak.store(self.current(), Ordering::SeqCst);
    }

    fn enter(&self) -> OccupancyTicket {
        let now = self.inner.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);
        OccupancyTicket {
            gauge: self.clone(),
        }
    }
}

struct OccupancyTicket {
    gauge: OccupancyGauge,
}

impl Drop for OccupancyTicket {
    fn drop(&mut self) {
        self.gauge.inner.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A carrier's seat, reserved but not yet counted as occupied.
///
/// Worker carriers reserve their seat before pulling the next job, and only
/// count it once the job is placed on the carrier.
pub struct Reservation {
    permit: OwnedSemaphorePermit,
    gauge: OccupancyGauge,
}

impl Reservation {
    pub(crate) fn new(permit: OwnedSemaphorePermit, gauge: OccupancyGauge) -> Self {
        Self { permit, gauge }
    }

    pub fn occupy(self) -> Occupancy {
        Occupancy {
            _ticket: self.gauge.enter(),
            _permit: self.permit,
        }
    }
}

/// Proof that a task currently holds a carrier. Dropping it frees the seat.
pub struct Occupancy {
    // Field order matters: the gauge is decremented before the seat is
    // released, so the next occupant can never be double counted.
    _ticket: OccupancyTicket,
    _permit: OwnedSemaphorePermit,
}
