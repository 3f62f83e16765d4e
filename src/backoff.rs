//! # BackOff
//!
//! Exponential backoff for contended acquisition via
//! [`RawSpinLock::lock_with_backoff`](crate::RawSpinLock::lock_with_backoff).
//!
//! The plain [`lock`](crate::RawSpinLock::lock) spins tightly with no delay
//! between attempts. A [`BackOff`] instead pauses for a growing number of
//! [`spin_loop`](core::hint::spin_loop) hints after each failed attempt, and
//! under the `std` feature yields the thread once the wait gets long.
//!
//! ```rust
//! use shm_spinlock::{BackOff, RawSpinLock};
//!
//! let lock = RawSpinLock::new();
//! let backoff = BackOff::new_with(4);
//!
//! assert!(lock.lock_with_backoff(None, &backoff));
//! lock.unlock();
//! ```

use core::cell::Cell;

use crate::sync::spin_loop;

/// Cap on spin iterations per wait.
const MAX_SPIN: u32 = 1 << 22;

/// Starting spin count.
const START_VALUE: u32 = 1 << 5;

/// Past this many spins a wait also yields the thread.
#[cfg(feature = "std")]
const YIELD_THRESHOLD: u32 = 1 << 10;

/// Shift applied by [`BackOff::relax`].
const RELAX_SHIFT: u32 = 1;

/// Per-caller exponential backoff state.
///
/// Not `Sync`: each waiting thread keeps its own.
#[derive(Debug)]
pub struct BackOff {
    spin: Cell<u32>,
}

impl BackOff {
    /// Spin hints issued between clock checks in [`BackOff::wait_until`].
    pub const CHUNK: u32 = START_VALUE;

    /// Creates a [`BackOff`] with the default starting spin count.
    #[inline(always)]
    pub const fn new() -> Self {
        Self::new_with(START_VALUE)
    }

    /// Starts from `start` spins instead of the default.
    #[inline(always)]
    pub const fn new_with(start: u32) -> Self {
        Self {
            spin: Cell::new(start),
        }
    }

    /// Spins for the current count, then doubles it (up to [`MAX_SPIN`]).
    #[inline]
    pub fn wait(&self) {
        let end = self.spin.get();

        for _ in 0..end {
            spin_loop();
        }

        self.grow(end);
        self.yield_if_long(end);
    }

    /// Like [`wait`](Self::wait), but checks the clock every
    /// [`CHUNK`](Self::CHUNK) spins and returns early once `deadline` passes.
    #[cfg(feature = "std")]
    pub fn wait_until(&self, deadline: std::time::Instant) {
        let end = self.spin.get();
        self.grow(end);

        let mut spun = 0;
        while spun < end {
            let chunk = (end - spun).min(Self::CHUNK);
            for _ in 0..chunk {
                spin_loop();
            }
            spun += chunk;
            if std::time::Instant::now() >= deadline {
                return;
            }
        }

        self.yield_if_long(end);
    }

    #[inline(always)]
    fn grow(&self, end: u32) {
        self.spin.set(end.saturating_mul(2).clamp(1, MAX_SPIN));
    }

    #[inline(always)]
    #[cfg_attr(not(feature = "std"), allow(unused_variables))]
    fn yield_if_long(&self, end: u32) {
        #[cfg(feature = "std")]
        if end > YIELD_THRESHOLD {
            log::trace!("backoff reached {} spins, yielding", end);
            std::thread::yield_now();
        }
    }

    /// Halves the next wait.
    #[inline(always)]
    pub fn relax(&self) {
        self.spin.set(self.spin.get() >> RELAX_SHIFT);
    }

    /// Returns the spin count of the next wait.
    #[inline(always)]
    pub fn current(&self) -> u32 {
        self.spin.get()
    }

    /// Restores the default starting spin count.
    #[inline(always)]
    pub fn reset(&self) {
        self.spin.set(START_VALUE);
    }

    /// Sets the spin count of the next wait.
    #[inline(always)]
    pub fn reset_to(&self, spin: u32) {
        self.spin.set(spin);
    }
}

impl Default for BackOff {
    fn default() -> Self {
        Self::new()
    }
}
