use std::time::Instant;

use crate::common::NodeId;
use crate::configuration::cluster::{ClusterConfiguration, FreshnessWindow};
use crate::leadership::heartbeat::PeerView;
use crate::operation_log::Position;

/// What to do with a due priority takeover.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TakeoverVerdict {
    NotFollower,
    Reconfiguring,
    NotFreshEnough,
    StandForElection,
}

/// Holds the single pending takeover deadline.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityTakeoverScheduler {
    deadline: Option<Instant>,
}

impl PriorityTakeoverScheduler {
    pub fn new() -> PriorityTakeoverScheduler {
        PriorityTakeoverScheduler::default()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn schedule(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| deadline <= now)
    }
}

/// A takeover is wanted while we can be elected and outrank the primary we follow.
pub fn takeover_wanted(
    config: &ClusterConfiguration,
    node_id: NodeId,
    primary: Option<&PeerView>,
) -> bool {
    let me = match config.member(node_id) {
        Some(me) if me.is_electable() => me,
        _ => return false,
    };

    match primary {
        Some(primary) => {
            let primary_priority = config.member(primary.id).map_or(0, |m| m.priority);
            me.priority > primary_priority
        }
        None => false,
    }
}

pub fn check_takeover(
    is_follower: bool,
    reconfiguring: bool,
    my_applied: Position,
    most_advanced: Option<Position>,
    window: &FreshnessWindow,
) -> TakeoverVerdict {
    if !is_follower {
        return TakeoverVerdict::NotFollower;
    }
    if reconfiguring {
        return TakeoverVerdict::Reconfiguring;
    }
    if let Some(latest) = most_advanced {
        if !window.is_close_enough(my_applied, latest) {
            return TakeoverVerdict::NotFreshEnough;
        }
    }

    TakeoverVerdict::StandForElection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::peers::ReportedRole;
    use crate::configuration::cluster::MemberConfiguration;
    use std::time::Duration;

    fn primary(id: NodeId) -> PeerView {
        PeerView {
            id,
            role: ReportedRole::Primary,
            term: 1,
            applied: Position::default(),
            durable: Position::default(),
            config_version: 1,
            up: true,
            last_heartbeat_at: None,
        }
    }

    fn config() -> ClusterConfiguration {
        ClusterConfiguration::new(
            1,
            vec![
                MemberConfiguration::with_priority(1, 2),
                MemberConfiguration::with_priority(2, 1),
                MemberConfiguration::non_voting(3),
            ],
        )
    }

    #[test]
    fn test_takeover_needs_higher_priority_than_primary() {
        let config = config();

        assert!(takeover_wanted(&config, 1, Some(&primary(2))));
        assert!(!takeover_wanted(&config, 2, Some(&primary(1))));
        assert!(!takeover_wanted(&config, 1, None));
        assert!(!takeover_wanted(&config, 3, Some(&primary(2))));
    }

    #[test]
    fn test_verdict_order() {
        let window = FreshnessWindow::default();
        let behind = Position::new(10, 0, 1);
        let latest = Some(Position::new(20, 0, 1));

        assert_eq!(
            TakeoverVerdict::NotFollower,
            check_takeover(false, true, behind, latest, &window)
        );
        assert_eq!(
            TakeoverVerdict::Reconfiguring,
            check_takeover(true, true, behind, latest, &window)
        );
        assert_eq!(
            TakeoverVerdict::NotFreshEnough,
            check_takeover(true, false, behind, latest, &window)
        );
        assert_eq!(
            TakeoverVerdict::StandForElection,
            check_takeover(true, false, Position::new(19, 0, 1), latest, &window)
        );
    }

    #[test]
    fn test_scheduler_deadline() {
        let now = Instant::now();
        let mut scheduler = PriorityTakeoverScheduler::new();
        assert!(!scheduler.cancel());

        scheduler.schedule(now + Duration::from_secs(1));
        assert!(scheduler.is_pending());
        assert!(!scheduler.is_due(now));
        assert!(scheduler.is_due(now + Duration::from_secs(1)));

        assert!(scheduler.cancel());
        assert!(!scheduler.is_due(now + Duration::from_secs(2)));
    }
}
