//! The two values a lock cell can hold.

/// Raw byte stored in an unlocked cell.
pub const UNLOCKED: u8 = 0;

/// Raw byte stored in a locked cell.
pub const LOCKED: u8 = 1;

/// Decoded state of a lock cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockState {
    Unlocked = UNLOCKED,
    Locked = LOCKED,
}

impl LockState {
    /// Decodes a raw cell byte.
    ///
    /// This crate only ever writes `0` or `1`, but a cell mapped over foreign
    /// memory may hold anything; every non-zero byte reads as locked.
    #[inline(always)]
    pub const fn from_raw(raw: u8) -> Self {
        if raw == UNLOCKED {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }

    /// The byte written to the cell for this state.
    #[inline(always)]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// `true` for [`LockState::Locked`].
    #[inline(always)]
    pub const fn is_locked(self) -> bool {
        matches!(self, LockState::Locked)
    }
}
