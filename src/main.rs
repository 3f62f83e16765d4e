//! Demo of `shm-spinlock`.
//!
//! Spawns worker threads that each get a clone of one [`SpinLock`] handle and
//! bump a shared counter with a deliberately non-atomic read/write pair, then
//! shows a timed acquisition giving up on a held lock.

use shm_spinlock::SpinLock;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 8;
const ROUNDS: u64 = 100_000;

fn add(lock: SpinLock, counter: Arc<AtomicU64>) {
    for _ in 0..ROUNDS {
        lock.lock(None);
        let v = counter.load(Relaxed);
        counter.store(v + 1, Relaxed);
        lock.unlock();
    }
}

fn main() {
    println!("Starting spinlock demo...");

    let lock = SpinLock::new();
    let counter = Arc::new(AtomicU64::new(0));

    let mut threads = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let (lock, counter) = (lock.clone(), counter.clone());
        threads.push(thread::spawn(move || add(lock, counter)));
    }

    for t in threads {
        let _ = t.join();
    }

    println!(
        "Final counter value: {} (expected {})",
        counter.load(Relaxed),
        WORKERS as u64 * ROUNDS
    );

    lock.lock(None);
    let other = lock.clone();
    let acquired = thread::spawn(move || other.lock(Some(Duration::from_millis(50))))
        .join()
        .unwrap_or(false);
    println!(
        "Timed lock while held: acquired={}, locked afterwards={}",
        acquired,
        lock.is_locked()
    );
}
