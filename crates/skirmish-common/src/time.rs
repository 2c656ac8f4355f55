//! Millisecond tick clock and wrap-tolerant cooldown arithmetic.
//!
//! Every time-dependent component works on a 32-bit millisecond tick count,
//! sampled once per frame from a [`Clock`]. The counter wraps after roughly
//! 49.7 days of uptime, so elapsed time is always computed with wrapping
//! subtraction and a huge apparent elapsed value is treated as "long ago".

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Milliseconds on the tick clock.
pub type Millis = u32;

/// Elapsed values above this are treated as a wrapped (or rewound) counter
/// and count as "cooldown satisfied".
pub const WRAP_GUARD_MS: Millis = 0x8000_0000;

/// Source of the current tick count.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> Millis;
}

/// Milliseconds elapsed from `then` to `now`, tolerant of counter wrap.
#[must_use]
pub const fn elapsed_ms(now: Millis, then: Millis) -> Millis {
    now.wrapping_sub(then)
}

/// Checks whether `cooldown` milliseconds have passed since `last`.
///
/// A cooldown of zero is always satisfied.
#[must_use]
pub const fn cooldown_satisfied(now: Millis, last: Millis, cooldown: Millis) -> bool {
    if cooldown == 0 {
        return true;
    }
    let elapsed = elapsed_ms(now, last);
    elapsed > WRAP_GUARD_MS || elapsed >= cooldown
}

/// Wall clock measured from construction, truncated to 32 bits.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock whose tick zero is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        // Truncation is the wrap.
        self.start.elapsed().as_millis() as Millis
    }
}

/// Manually driven clock for tests and scripted simulations.
///
/// Clones share the same counter, so a test can keep one handle while the
/// system under test owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    /// Creates a clock starting at `start`.
    #[must_use]
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(start)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Advances the current time, wrapping at `u32::MAX`.
    pub fn advance(&self, delta: Millis) {
        // fetch_add on atomics wraps
        self.now.fetch_add(delta, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}
