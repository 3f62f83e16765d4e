//! # RawSpinLock
//!
//! The lock itself: a single byte of shared memory driven only by atomic
//! compare-and-swap, store and load. It carries no data and records no owner;
//! any thread that can see the byte may lock or unlock it.
//!
//! A [`RawSpinLock`] can live anywhere a byte can: in a `static`, inside an
//! [`Arc`](crate::SpinLock), or inside a memory-mapped region shared with
//! another process (see [`RawSpinLock::from_ptr`]).
//!
//! ## Timeouts
//!
//! [`RawSpinLock::lock`] keeps the historical contract of this primitive:
//!
//! - `None` and `Some(Duration::ZERO)` both mean "spin until acquired".
//! - When a non-zero timeout expires the cell is **forcibly cleared** before
//!   `false` is returned, even though the caller never held the lock. This
//!   can release a lock legitimately held by another thread.
//!
//! [`RawSpinLock::try_lock_for`] is the non-destructive variant: on expiry it
//! leaves the cell alone, and a zero timeout is a single attempt.
//!
//! ## Example
//! ```rust
//! use shm_spinlock::RawSpinLock;
//! use std::time::Duration;
//!
//! static LOCK: RawSpinLock = RawSpinLock::new();
//!
//! assert!(LOCK.lock(None));
//! assert!(LOCK.is_locked());
//! assert!(!LOCK.try_lock_for(Duration::from_millis(1)));
//! LOCK.unlock();
//! assert!(!LOCK.is_locked());
//! ```

use core::fmt;
#[cfg(feature = "std")]
use core::time::Duration;

use crate::state::{LockState, LOCKED, UNLOCKED};
use crate::sync::{spin_loop, AtomicU8, Ordering::SeqCst};
#[cfg(feature = "std")]
use crate::BackOff;

/// A one-byte spinlock cell.
///
/// `#[repr(transparent)]` over an atomic byte, so it occupies exactly one
/// byte and can be overlaid on shared memory.
#[repr(transparent)]
pub struct RawSpinLock {
    state: AtomicU8,
}

impl RawSpinLock {
    /// Size in bytes of the cell in shared memory.
    pub const SIZE: usize = 1;

    /// Creates an unlocked cell.
    #[cfg(not(loom))]
    #[inline(always)]
    pub const fn new() -> Self {
        RawSpinLock {
            state: AtomicU8::new(UNLOCKED),
        }
    }

    #[cfg(loom)]
    pub fn new() -> Self {
        RawSpinLock {
            state: AtomicU8::new(UNLOCKED),
        }
    }

    /// Views a byte of caller-provided memory as a lock cell.
    ///
    /// The byte is used as-is; zero it (or call [`unlock`](Self::unlock))
    /// before first use if the region is not already zero-initialized.
    ///
    /// # Safety
    /// - `ptr` must be non-null and valid for reads and writes for `'a`.
    /// - For the whole of `'a`, every access to the byte (from any thread or
    ///   process) must be atomic.
    #[cfg(not(loom))]
    #[inline(always)]
    pub unsafe fn from_ptr<'a>(ptr: *mut u8) -> &'a Self {
        // u8 and AtomicU8 share size and alignment, and Self is transparent.
        &*ptr.cast::<Self>()
    }

    /// Attempts a single compare-and-swap from unlocked to locked.
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, SeqCst, SeqCst)
            .is_ok()
    }

    /// Spins until the lock is acquired. Never gives up.
    #[inline]
    pub fn acquire(&self) {
        while !self.try_lock() {
            spin_loop();
        }
    }

    /// Acquires the lock, spinning on the calling thread.
    ///
    /// With `None` or a zero timeout this never checks the clock and always
    /// returns `true`. Otherwise elapsed time is checked after every failed
    /// attempt; once it reaches `timeout` the cell is forcibly set to unlocked
    /// and `false` is returned.
    ///
    /// Returns `true` only if this call's own compare-and-swap succeeded.
    ///
    /// # Hazard
    /// The forced unlock on expiry can release a lock held by someone else.
    /// Use [`try_lock_for`](Self::try_lock_for) if that is not wanted.
    #[cfg(feature = "std")]
    pub fn lock(&self, timeout: Option<Duration>) -> bool {
        self.lock_relaxing(timeout, |_| spin_loop())
    }

    /// Same contract as [`lock`](Self::lock), but waits with `backoff`
    /// between failed attempts instead of spinning tightly.
    ///
    /// With a timeout, each wait is cut short once the deadline passes, so
    /// the call overshoots `timeout` by at most one burst of
    /// [`BackOff::CHUNK`] spin hints plus one attempt.
    #[cfg(feature = "std")]
    pub fn lock_with_backoff(&self, timeout: Option<Duration>, backoff: &BackOff) -> bool {
        self.lock_relaxing(timeout, |deadline| match deadline {
            Some(deadline) => backoff.wait_until(deadline),
            None => backoff.wait(),
        })
    }

    #[cfg(feature = "std")]
    fn lock_relaxing(
        &self,
        timeout: Option<Duration>,
        mut relax: impl FnMut(Option<std::time::Instant>),
    ) -> bool {
        let timeout = match timeout {
            Some(t) if !t.is_zero() => t,
            _ => {
                while !self.try_lock() {
                    relax(None);
                }
                return true;
            }
        };

        let start = std::time::Instant::now();
        // An unrepresentable deadline only disables the early cut in `relax`.
        let deadline = start.checked_add(timeout);
        while !self.try_lock() {
            if start.elapsed() >= timeout {
                log::warn!(
                    "spinlock not acquired within {:?}, forcing cell to unlocked",
                    timeout
                );
                self.unlock();
                return false;
            }
            relax(deadline);
        }
        true
    }

    /// Tries to acquire the lock until `timeout` elapses.
    ///
    /// Unlike [`lock`](Self::lock), giving up leaves the cell untouched, and
    /// a zero timeout makes exactly one attempt.
    #[cfg(feature = "std")]
    pub fn try_lock_for(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        loop {
            if self.try_lock() {
                return true;
            }
            if start.elapsed() >= timeout {
                log::debug!("spinlock not acquired within {:?}, giving up", timeout);
                return false;
            }
            spin_loop();
        }
    }

    /// Tries to acquire the lock within `spins` compare-and-swap attempts.
    #[inline]
    pub fn try_lock_spins(&self, spins: usize) -> bool {
        for _ in 0..spins {
            if self.try_lock() {
                return true;
            }
            spin_loop();
        }
        false
    }

    /// Unconditionally marks the cell unlocked.
    ///
    /// There is no ownership check: this releases the lock whoever holds it,
    /// and is a no-op on an unlocked cell.
    #[inline]
    pub fn unlock(&self) {
        self.state.store(UNLOCKED, SeqCst);
    }

    /// Point-in-time check whether the cell is locked. May be stale as soon
    /// as it returns.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    /// Point-in-time decoded state of the cell.
    #[inline]
    pub fn state(&self) -> LockState {
        LockState::from_raw(self.state.load(SeqCst))
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawSpinLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpinLock")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod test {
    use crate::{LockState, RawSpinLock};

    #[test]
    fn test_fresh_lock_is_unlocked() {
        let lock = RawSpinLock::new();
        assert!(!lock.is_locked());
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[test]
    fn test_cell_is_one_byte() {
        assert_eq!(core::mem::size_of::<RawSpinLock>(), RawSpinLock::SIZE);
        assert_eq!(core::mem::align_of::<RawSpinLock>(), 1);
    }

    #[test]
    fn test_acquire_unlock_round_trip() {
        let lock = RawSpinLock::new();
        lock.acquire();
        assert!(lock.is_locked());
        assert!(!lock.try_lock());
        lock.unlock();
        assert!(!lock.is_locked());
        assert!(lock.try_lock());
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let lock = RawSpinLock::new();
        lock.unlock();
        lock.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_try_lock_spins() {
        let lock = RawSpinLock::new();
        assert!(lock.try_lock_spins(1));
        assert!(!lock.try_lock_spins(10), "Lock should not be acquirable while held");
        assert!(!lock.try_lock_spins(0));
        lock.unlock();
        assert!(lock.try_lock_spins(1000));
    }

    #[cfg(feature = "std")]
    mod timed {
        use crate::{BackOff, RawSpinLock};
        use std::sync::Arc;
        use std::thread;
        use std::time::{Duration, Instant};

        #[test]
        fn test_lock_without_timeout() {
            let lock = RawSpinLock::new();
            assert!(lock.lock(None));
            assert!(lock.is_locked());
            lock.unlock();
            assert!(!lock.is_locked());
        }

        #[test]
        fn test_timeout_forces_unlock() {
            let lock = Arc::new(RawSpinLock::new());
            assert!(lock.lock(None));

            let contender = lock.clone();
            let started = Instant::now();
            let acquired = thread::spawn(move || contender.lock(Some(Duration::from_millis(50))))
                .join()
                .unwrap();

            assert!(!acquired, "Timed lock should give up while the cell is held");
            assert!(started.elapsed() >= Duration::from_millis(50));
            assert!(!lock.is_locked(), "Expired lock() clears the cell");
        }

        #[test]
        fn test_zero_timeout_waits_like_none() {
            let lock = Arc::new(RawSpinLock::new());
            assert!(lock.lock(None));

            let holder = lock.clone();
            let releaser = thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                holder.unlock();
            });

            let started = Instant::now();
            assert!(lock.lock(Some(Duration::ZERO)));
            assert!(started.elapsed() >= Duration::from_millis(20));
            assert!(lock.is_locked());
            releaser.join().unwrap();
        }

        #[test]
        fn test_timed_lock_acquires_free_cell() {
            let lock = RawSpinLock::new();
            assert!(lock.lock(Some(Duration::from_millis(100))));
            assert!(lock.is_locked());

            lock.unlock();
            assert!(lock.lock_with_backoff(Some(Duration::from_millis(100)), &BackOff::new()));
            assert!(lock.is_locked());
        }

        #[test]
        fn test_timed_lock_acquires_after_release() {
            let lock = Arc::new(RawSpinLock::new());

            for use_backoff in [false, true] {
                assert!(lock.lock(None));

                let holder = lock.clone();
                let releaser = thread::spawn(move || {
                    thread::sleep(Duration::from_millis(20));
                    holder.unlock();
                });

                let timeout = Some(Duration::from_millis(500));
                let acquired = if use_backoff {
                    lock.lock_with_backoff(timeout, &BackOff::new())
                } else {
                    lock.lock(timeout)
                };
                releaser.join().unwrap();

                assert!(acquired, "Timed lock should win once the holder releases");
                assert!(lock.is_locked(), "Successful timed lock must leave the cell held");
                lock.unlock();
            }
        }

        #[test]
        fn test_backoff_timeout_is_not_stretched_by_long_waits() {
            let lock = RawSpinLock::new();
            assert!(lock.lock(None));

            // A single untimed wait of this size would spin for seconds.
            let backoff = BackOff::new_with(u32::MAX);
            let started = Instant::now();
            assert!(!lock.lock_with_backoff(Some(Duration::from_millis(20)), &backoff));

            let took = started.elapsed();
            assert!(took >= Duration::from_millis(20));
            assert!(took < Duration::from_secs(1), "Backoff overshot the timeout: {:?}", took);
            assert!(!lock.is_locked());
        }

        #[test]
        fn test_try_lock_for_leaves_cell_alone() {
            let lock = RawSpinLock::new();
            assert!(lock.lock(None));

            assert!(!lock.try_lock_for(Duration::from_millis(10)));
            assert!(lock.is_locked(), "Non-destructive timeout must not clear the cell");
            assert!(!lock.try_lock_for(Duration::ZERO));

            lock.unlock();
            assert!(lock.try_lock_for(Duration::ZERO));
        }

        #[test]
        fn test_blocked_lock_returns_after_unlock() {
            let lock = Arc::new(RawSpinLock::new());
            assert!(lock.lock(None));

            let contender = lock.clone();
            let waiter = thread::spawn(move || contender.lock(None));

            thread::sleep(Duration::from_millis(20));
            assert!(!waiter.is_finished(), "Waiter must spin while the cell is held");

            lock.unlock();
            assert!(waiter.join().unwrap());
            assert!(lock.is_locked(), "Waiter now holds the cell");
        }

        #[test]
        fn test_lock_with_backoff() {
            let lock = Arc::new(RawSpinLock::new());
            let backoff = BackOff::new();
            assert!(lock.lock_with_backoff(None, &backoff));

            let contender = lock.clone();
            let acquired = thread::spawn(move || {
                contender.lock_with_backoff(Some(Duration::from_millis(20)), &BackOff::new())
            })
            .join()
            .unwrap();

            assert!(!acquired);
            assert!(!lock.is_locked());
        }

        #[test]
        fn test_mutual_exclusion() {
            use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

            let lock = Arc::new(RawSpinLock::new());
            let counter = Arc::new(AtomicUsize::new(0));
            let mut handles = vec![];

            for _ in 0..4 {
                let lock = lock.clone();
                let counter = counter.clone();
                handles.push(thread::spawn(move || {
                    for _ in 0..10_000 {
                        assert!(lock.lock(None));
                        // Split read/write: only correct under exclusion.
                        let v = counter.load(Relaxed);
                        counter.store(v + 1, Relaxed);
                        lock.unlock();
                    }
                }));
            }

            for h in handles {
                h.join().unwrap();
            }

            assert_eq!(counter.load(Relaxed), 4 * 10_000, "Counter should match total increments");
            assert!(!lock.is_locked());
        }
    }
}
