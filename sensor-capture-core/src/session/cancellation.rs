use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lock-free cooperative cancellation flag.
///
/// Cloning shares the flag. Setting it never blocks, so it is safe to call
/// from a trigger source running concurrently with a poll or capture loop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());

        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn fresh_tokens_are_independent() {
        let first = CancellationToken::new();
        first.cancel();

        let second = CancellationToken::new();
        assert!(!second.is_cancelled());
        first.cancel();
        assert!(!second.is_cancelled());
    }
}
