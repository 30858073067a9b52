//! Wall-clock abstraction.
//!
//! Expiry checks read the current Unix time through [`Clock`] so that the
//! boundary behavior can be pinned down in tests with [`FixedClock`].

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A manually driven clock.
///
/// # Examples
///
/// ```
/// use streamgate_auth::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1_000);
/// clock.advance(601);
/// assert_eq!(clock.now(), 1_601);
/// ```
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self(AtomicI64::new(now))
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
