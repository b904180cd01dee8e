//! Monotonic time sources for the recorder.
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

/// Monotonic nanosecond time source.
pub trait Clock: Send + Sync + 'static {
    /// Nanoseconds since an arbitrary, fixed origin. Never goes backwards.
    fn now_nanos(&self) -> u64;
}

/// Shared handle to a clock.
pub type ClockHandle = Arc<dyn Clock>;

/// Clock backed by [`Instant`], counting from its own construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for deterministic timing in tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Clock frozen at `start_nanos` until moved.
    pub fn new(start_nanos: u64) -> Self {
        Self {
            now: AtomicU64::new(start_nanos),
        }
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Jump to an absolute reading. Callers keep it monotonic.
    pub fn set(&self, nanos: u64) {
        self.now.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
