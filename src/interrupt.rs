//! Cooperative cancellation for long-running buffer computations.

use crate::errors::BufferError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shareable interrupt flag, polled by the pipeline at coarse milestones
/// (around noding, subgraph construction, and depth assignment).
///
/// Cloning is cheap; all clones observe the same flag. Timeouts are not
/// built in - callers that want one should set the flag from a timer thread.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag {
    requested: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The pipeline fails with
    /// [`BufferError::Interrupted`] at its next checkpoint.
    pub fn interrupt(&self) {
        self.requested.store(true, Ordering::Relaxed);
    }

    /// Clear the flag so the owner can be reused for another run.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    /// Milestone check: error out if an interrupt was requested.
    pub fn check(&self) -> Result<(), BufferError> {
        if self.is_requested() {
            Err(BufferError::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_roundtrip() {
        let flag = InterruptFlag::new();
        assert!(flag.check().is_ok());
        flag.interrupt();
        assert_eq!(flag.check(), Err(BufferError::Interrupted));
        flag.reset();
        assert!(flag.check().is_ok());
    }
}
