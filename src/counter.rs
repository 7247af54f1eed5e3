//! Atomic Counter
//!
//! A signed 64-bit counter with combined modify-and-read operations.

use core::sync::atomic::{AtomicI64, Ordering};

/// Thread-safe counter.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicI64,
}

impl AtomicCounter {
    /// Create a counter starting at `initial`
    pub const fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
        }
    }

    /// Current value
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Replace the value
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Add one and return the new value
    pub fn increment_and_get(&self) -> i64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Subtract one and return the new value
    pub fn decrement_and_get(&self) -> i64 {
        self.value.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// Add `delta` and return the new value
    pub fn add_and_get(&self, delta: i64) -> i64 {
        self.value.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn basic_ops() {
        let counter = AtomicCounter::new(10);
        assert_eq!(counter.get(), 10);
        assert_eq!(counter.increment_and_get(), 11);
        assert_eq!(counter.decrement_and_get(), 10);
        assert_eq!(counter.add_and_get(-15), -5);
        counter.set(0);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn concurrent_increments() {
        let counter = Arc::new(AtomicCounter::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment_and_get();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(), 8000);
    }
}
