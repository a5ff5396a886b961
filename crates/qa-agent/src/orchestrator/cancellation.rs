//! Cooperative cancellation (spec §4.5, §5).
//!
//! A thin wrapper over [`tokio_util::sync::CancellationToken`] so the rest of
//! the crate depends on a small named type rather than the raw token, and so
//! tests can construct one without reaching into `tokio_util` directly.

use tokio_util::sync::CancellationToken;

/// Shared signal observed at every suspension point in the orchestrator.
/// Cloning shares the same underlying token — cancelling any clone cancels
/// all of them, including the copy handed to tool invocations.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle(CancellationToken);

impl CancellationHandle {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once `cancel()` is called on this handle or any of its clones.
    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }

    /// A fresh handle derived from this one: cancelling the parent cancels
    /// the child, but cancelling the child does not affect the parent or its
    /// siblings. Used to scope a tool invocation's cancellation to the parent
    /// run without letting the tool cancel anything outside itself.
    pub fn child(&self) -> Self {
        Self(self.0.child_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelling_a_clone_cancels_the_original() {
        let handle = CancellationHandle::new();
        let clone = handle.clone();
        clone.cancel();
        assert!(handle.is_cancelled());
        handle.cancelled().await;
    }

    #[tokio::test]
    async fn child_cancellation_does_not_propagate_up() {
        let parent = CancellationHandle::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
