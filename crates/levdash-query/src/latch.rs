//! Duplicate-submission guard for mutations.
//!
//! A latch is held for the whole lifetime of a mutation. While held, further
//! submissions of the same action are refused, which is the client-side
//! equivalent of disabling the triggering button until the request settles.

use std::sync::atomic::{AtomicBool, Ordering};

/// Single-holder latch.
#[derive(Debug, Default)]
pub struct ActionLatch {
    held: AtomicBool,
}

impl ActionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the latch, or `None` if a submission is already pending.
    pub fn try_acquire(&self) -> Option<ActionGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActionGuard { latch: self })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Releases the latch on drop, including when the mutation future is dropped.
#[derive(Debug)]
pub struct ActionGuard<'a> {
    latch: &'a ActionLatch,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.latch.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_refused_until_release() {
        let latch = ActionLatch::new();

        let guard = latch.try_acquire();
        assert!(guard.is_some());
        assert!(latch.is_held());
        assert!(latch.try_acquire().is_none());

        drop(guard);
        assert!(!latch.is_held());
        assert!(latch.try_acquire().is_some());
    }
}
