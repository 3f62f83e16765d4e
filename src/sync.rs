//! Atomics used by the lock cell, swapped for loom's model-checked types
//! when built with `--cfg loom`.

#[cfg(not(loom))]
pub(crate) use core::{
    hint::spin_loop,
    sync::atomic::{AtomicU8, Ordering},
};

#[cfg(all(not(loom), feature = "alloc"))]
pub(crate) use alloc::sync::Arc;

#[cfg(loom)]
pub(crate) use loom::{
    hint::spin_loop,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
};
