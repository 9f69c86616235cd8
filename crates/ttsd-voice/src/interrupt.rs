//! Interrupt flag: lets the command reader preempt a running generation.
//!
//! The reader sets the flag the moment an `interrupt` command arrives, without
//! going through the command queue. The controller clears it when a new
//! generation starts and checks it before writing each chunk.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared interrupt request for the current generation.
///
/// Cloning shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    requested: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Create a new flag (initially clear).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running generation stop.
    pub fn set(&self) {
        self.requested.store(true, Ordering::SeqCst);
        tracing::debug!("Interrupt requested");
    }

    /// Clear the flag, returning whether it was set.
    ///
    /// Called exactly once at the start of every generation so a stale
    /// interrupt never leaks into the next request.
    pub fn clear(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    /// Check whether an interrupt has been requested.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clear() {
        assert!(!InterruptFlag::new().is_set());
    }

    #[test]
    fn set_then_clear() {
        let flag = InterruptFlag::new();

        flag.set();
        assert!(flag.is_set());

        assert!(flag.clear());
        assert!(!flag.is_set());
        assert!(!flag.clear());
    }

    #[test]
    fn clone_shares_state() {
        let reader_side = InterruptFlag::new();
        let controller_side = reader_side.clone();

        reader_side.set();
        assert!(controller_side.is_set());

        controller_side.clear();
        assert!(!reader_side.is_set());
    }

    #[test]
    fn set_from_another_thread_is_observed() {
        let flag = InterruptFlag::new();
        let remote = flag.clone();

        std::thread::spawn(move || remote.set()).join().unwrap();

        assert!(flag.is_set());
    }
}
