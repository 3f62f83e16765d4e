//! # SpinLock
//!
//! An owned, cloneable handle to one [`RawSpinLock`] cell.
//!
//! Every clone points at the same byte, so handing a clone to another thread
//! is how the lock is shared. The cell is freed when the last handle is
//! dropped.
//!
//! ## Example
//! ```rust
//! use shm_spinlock::SpinLock;
//! use std::thread;
//! use std::time::Duration;
//!
//! let lock = SpinLock::new();
//! assert!(lock.lock(None));
//!
//! let other = lock.clone();
//! let gave_up = thread::spawn(move || !other.lock(Some(Duration::from_millis(10))))
//!     .join()
//!     .unwrap();
//!
//! assert!(gave_up);
//! assert!(!lock.is_locked());
//! ```

use core::fmt;
use core::ops::Deref;

use crate::sync::Arc;
use crate::RawSpinLock;

/// Shared handle to a lock cell. Dereferences to [`RawSpinLock`].
#[derive(Clone)]
pub struct SpinLock {
    cell: Arc<RawSpinLock>,
}

impl SpinLock {
    /// Allocates a fresh, unlocked cell.
    pub fn new() -> Self {
        SpinLock {
            cell: Arc::new(RawSpinLock::new()),
        }
    }

    /// Whether both handles share the same cell.
    #[inline]
    pub fn ptr_eq(&self, other: &SpinLock) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// The shared cell behind this handle.
    #[inline(always)]
    pub fn raw(&self) -> &RawSpinLock {
        &self.cell
    }
}

impl Deref for SpinLock {
    type Target = RawSpinLock;

    #[inline(always)]
    fn deref(&self) -> &RawSpinLock {
        &self.cell
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpinLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("state", &self.state())
            .finish()
    }
}
