//! # shm-spinlock
//!
//! A one-byte spinlock for execution contexts that share nothing but a
//! region of memory. The whole lock is a single atomic byte (`0` unlocked,
//! `1` locked) driven by compare-and-swap, with an optional timeout on
//! acquisition.
//!
//! - [`RawSpinLock`] is the cell. It can be placed in a `static`, or overlaid
//!   on a byte of memory-mapped shared memory with [`RawSpinLock::from_ptr`].
//! - [`SpinLock`] is an `Arc`-backed handle; clones share one cell.
//! - [`SpinGuard`] releases the cell on drop.
//! - [`BackOff`] is an optional exponential backoff between attempts.
//!
//! ## Quick Example
//!
//! ```rust
//! use shm_spinlock::SpinLock;
//!
//! let lock = SpinLock::new();
//! assert!(!lock.is_locked());
//!
//! assert!(lock.lock(None));
//! assert!(lock.is_locked());
//!
//! lock.unlock();
//! assert!(!lock.is_locked());
//! ```
//!
//! ## Semantics
//!
//! - No fairness, no reentrancy, no owner tracking. Any holder of the cell
//!   may unlock it.
//! - All cell accesses are `SeqCst`.
//! - `lock(None)` and `lock(Some(Duration::ZERO))` both spin forever.
//! - A `lock` whose non-zero timeout expires **clears the cell** before
//!   returning `false`. [`RawSpinLock::try_lock_for`] gives up without
//!   touching it.
//!
//! ## Feature flags
//!
//! - **`std`** (default): timed acquisition and thread yielding in
//!   [`BackOff`]. Implies `alloc`.
//! - **`alloc`**: the [`SpinLock`] handle.
//!
//! Run the loom model tests with `RUSTFLAGS="--cfg loom" cargo test --lib --release`.
//! Doctests and `tests/` assume a regular build.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod backoff;
pub mod guard;
pub mod raw;
#[cfg(feature = "alloc")]
pub mod spinlock;
pub mod state;

mod sync;

pub use backoff::BackOff;
pub use guard::SpinGuard;
pub use raw::RawSpinLock;
#[cfg(feature = "alloc")]
pub use spinlock::SpinLock;
pub use state::LockState;
