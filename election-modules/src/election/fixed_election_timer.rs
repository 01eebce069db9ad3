use raft::ElectionTimer;
use std::time::Duration;

/// Always returns the same offset, clamped to the allowed bound. Makes election timing
/// reproducible.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FixedElectionTimer {
    fixed_offset_ms: u64,
}

impl FixedElectionTimer {
    pub fn new(fixed_offset_ms: u64) -> FixedElectionTimer {
        FixedElectionTimer { fixed_offset_ms }
    }
}

impl ElectionTimer for FixedElectionTimer {
    fn next_offset(&mut self, upper_bound: Duration) -> Duration {
        Duration::from_millis(self.fixed_offset_ms).min(upper_bound)
    }
}
