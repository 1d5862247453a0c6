use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

/// An integer timestamp as supplied by a [`Clock`].
///
/// The core only ever compares timestamps and adds durations to them, so the
/// unit is whatever the clock provides (whole seconds for [`SystemClock`]).
pub type Timestamp = i64;

/// A source of the current time.
///
/// The clock is a pure input: the core reads it on entry to an operation and
/// never schedules anything against it. Phase transitions are detected
/// lazily from these readings.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time in whole seconds since the Unix epoch.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

/// A clock advanced by hand.
///
/// Matches hosts where time is an externally-advanced input rather than the
/// wall clock, and makes tests deterministic.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// A manual clock reading `now`.
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to the given reading.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the reading forward by `delta`.
    pub fn advance(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
