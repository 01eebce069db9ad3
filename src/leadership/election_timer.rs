use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use crate::configuration::cluster::MIN_ELECTION_TIMEOUT;

/// Source of the random part of election and takeover delays.
pub trait ElectionTimer: Send + 'static {
    /// Returns an offset within `[0, upper_bound]`.
    fn next_offset(&mut self, upper_bound: Duration) -> Duration;
}

/// Uniformly distributed offsets. Seed it to get a reproducible sequence.
#[derive(Debug)]
pub struct RandomizedElectionTimer {
    rng: StdRng,
}

impl RandomizedElectionTimer {
    pub fn new() -> RandomizedElectionTimer {
        RandomizedElectionTimer {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> RandomizedElectionTimer {
        RandomizedElectionTimer {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomizedElectionTimer {
    fn default() -> Self {
        RandomizedElectionTimer::new()
    }
}

impl ElectionTimer for RandomizedElectionTimer {
    fn next_offset(&mut self, upper_bound: Duration) -> Duration {
        let upper_ms = upper_bound.as_millis() as u64;
        if upper_ms == 0 {
            return Duration::from_millis(0);
        }

        Duration::from_millis(self.rng.gen_range(0..=upper_ms))
    }
}

/// Largest random offset added to `base`. Collapses to zero for a base at or below the
/// minimal election timeout, and when the millisecond bound truncates to zero.
pub fn offset_upper_bound(base: Duration, offset_fraction: f64) -> Duration {
    if base <= MIN_ELECTION_TIMEOUT || offset_fraction <= 0.0 {
        return Duration::from_millis(0);
    }

    let upper_ms = (base.as_millis() as f64 * offset_fraction) as u64;
    Duration::from_millis(upper_ms)
}

pub fn randomized_offset<Et: ElectionTimer>(
    timer: &mut Et,
    base: Duration,
    offset_fraction: f64,
) -> Duration {
    let upper_bound = offset_upper_bound(base, offset_fraction);
    if upper_bound == Duration::from_millis(0) {
        return upper_bound;
    }

    let offset = timer.next_offset(upper_bound);
    offset.min(upper_bound)
}

/// The single election deadline of a node.
#[derive(Debug)]
pub struct ElectionTimeoutScheduler<Et: ElectionTimer> {
    timer: Et,
    deadline: Option<Instant>,
}

impl<Et: ElectionTimer> ElectionTimeoutScheduler<Et> {
    pub fn new(timer: Et) -> ElectionTimeoutScheduler<Et> {
        ElectionTimeoutScheduler {
            timer,
            deadline: None,
        }
    }

    /// Replaces the pending deadline with `now + base + random offset`.
    pub fn arm(&mut self, now: Instant, base: Duration, offset_fraction: f64) -> Instant {
        let offset = randomized_offset(&mut self.timer, base, offset_fraction);
        let deadline = now + base + offset;
        self.deadline = Some(deadline);

        deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| deadline <= now)
    }

    /// Offset for other randomized delays, drawn from the same source.
    pub fn offset(&mut self, base: Duration, offset_fraction: f64) -> Duration {
        randomized_offset(&mut self.timer, base, offset_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_stay_within_bound() {
        let mut timer = RandomizedElectionTimer::with_seed(42);
        let base = Duration::from_millis(10_000);
        let upper = offset_upper_bound(base, 0.15);
        assert_eq!(Duration::from_millis(1500), upper);

        let mut seen_non_zero = false;
        for _ in 0..2000 {
            let offset = randomized_offset(&mut timer, base, 0.15);
            assert!(offset <= upper);
            seen_non_zero |= offset > Duration::from_millis(0);
        }
        assert!(seen_non_zero);
    }

    #[test]
    fn test_minimal_base_has_no_offset() {
        let mut timer = RandomizedElectionTimer::with_seed(7);

        for _ in 0..1000 {
            let offset = randomized_offset(&mut timer, MIN_ELECTION_TIMEOUT, 0.15);
            assert_eq!(Duration::from_millis(0), offset);
        }
    }

    #[test]
    fn test_truncated_bound_has_no_offset() {
        // 5ms * 0.15 truncates to 0ms
        assert_eq!(
            Duration::from_millis(0),
            offset_upper_bound(Duration::from_millis(5), 0.15)
        );
        assert_eq!(
            Duration::from_millis(1),
            offset_upper_bound(Duration::from_millis(10), 0.15)
        );
    }

    #[test]
    fn test_scheduler_rearm_replaces_deadline() {
        let mut scheduler = ElectionTimeoutScheduler::new(RandomizedElectionTimer::with_seed(1));
        let now = Instant::now();
        let base = Duration::from_millis(100);

        let first = scheduler.arm(now, base, 0.0);
        assert_eq!(now + base, first);
        assert!(!scheduler.is_expired(now));
        assert!(scheduler.is_expired(first));

        let later = now + Duration::from_millis(50);
        let second = scheduler.arm(later, base, 0.0);
        assert_eq!(Some(second), scheduler.deadline());
        assert!(!scheduler.is_expired(first));

        scheduler.cancel();
        assert_eq!(None, scheduler.deadline());
        assert!(!scheduler.is_expired(second));
    }
}
