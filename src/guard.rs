//! RAII release for a [`RawSpinLock`].
//!
//! The cell records no owner, so a guard is a convenience rather than a
//! proof of ownership: anyone may still call [`RawSpinLock::unlock`] while
//! a guard is alive.

#[cfg(feature = "std")]
use core::time::Duration;

use crate::RawSpinLock;

/// Releases the lock when dropped.
#[must_use = "if unused the lock is released immediately"]
#[derive(Debug)]
pub struct SpinGuard<'a> {
    lock: &'a RawSpinLock,
}

impl<'a> SpinGuard<'a> {
    /// The cell this guard releases.
    #[inline(always)]
    pub fn lock(&self) -> &'a RawSpinLock {
        self.lock
    }
}

impl<'a> Drop for SpinGuard<'a> {
    #[inline]
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

impl RawSpinLock {
    /// Spins until acquired and returns a guard.
    #[inline]
    pub fn acquire_guard(&self) -> SpinGuard<'_> {
        self.acquire();
        SpinGuard { lock: self }
    }

    /// Single attempt; `None` if the cell is held.
    #[inline]
    pub fn try_guard(&self) -> Option<SpinGuard<'_>> {
        if self.try_lock() {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Guarded form of [`lock`](RawSpinLock::lock), with the same timeout
    /// rules, including the forced unlock on expiry.
    #[cfg(feature = "std")]
    #[inline]
    pub fn guard(&self, timeout: Option<Duration>) -> Option<SpinGuard<'_>> {
        if self.lock(timeout) {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Runs `f` while holding the lock.
    ///
    /// # Example
    /// ```
    /// use shm_spinlock::RawSpinLock;
    /// let lock = RawSpinLock::new();
    /// let held = lock.with_lock(|| lock.is_locked());
    /// assert!(held);
    /// assert!(!lock.is_locked());
    /// ```
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.acquire_guard();
        f()
    }
}
