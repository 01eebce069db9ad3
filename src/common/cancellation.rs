use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag held by every in-flight asynchronous operation (vote fan-out, freshness scan).
/// Once cancelled it stays cancelled; clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
