use std::time::Duration;

use crate::common::NodeId;
use crate::operation_log::Position;

/// Election timeouts at or below this floor get no random offset.
pub const MIN_ELECTION_TIMEOUT: Duration = Duration::from_millis(1);

/// Tolerance used when deciding whether a lagging node may call a priority takeover.
/// Positions in the same outer second are compared by increment, otherwise by seconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FreshnessWindow {
    pub window_secs: u32,
    pub window_increments: u32,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        FreshnessWindow {
            window_secs: 2,
            window_increments: 1000,
        }
    }
}

impl FreshnessWindow {
    pub fn is_close_enough(&self, mine: Position, latest: Position) -> bool {
        if mine >= latest {
            return true;
        }

        let (mine, latest) = (mine.timestamp, latest.timestamp);
        if mine.secs != latest.secs {
            u64::from(mine.secs) + u64::from(self.window_secs) >= u64::from(latest.secs)
        } else {
            u64::from(mine.inc) + u64::from(self.window_increments) >= u64::from(latest.inc)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectionSettings {
    pub election_timeout: Duration,
    pub election_timeout_offset_fraction: f64,
    pub heartbeat_interval: Duration,
    pub catch_up_timeout: Duration,
    pub priority_takeover_delay_step: Duration,
    pub freshness_window: FreshnessWindow,
}

impl Default for ElectionSettings {
    fn default() -> Self {
        ElectionSettings {
            election_timeout: Duration::from_secs(10),
            election_timeout_offset_fraction: 0.15,
            heartbeat_interval: Duration::from_secs(2),
            catch_up_timeout: Duration::from_secs(2),
            priority_takeover_delay_step: Duration::from_secs(5),
            freshness_window: FreshnessWindow::default(),
        }
    }
}

impl ElectionSettings {
    /// Settings derived from an election timeout, keeping the default proportions.
    pub fn with_election_timeout(election_timeout: Duration) -> ElectionSettings {
        ElectionSettings {
            election_timeout,
            priority_takeover_delay_step: election_timeout / 2,
            ..ElectionSettings::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MemberConfiguration {
    pub id: NodeId,
    pub votes: bool,
    pub priority: u32,
    pub hidden: bool,
}

impl MemberConfiguration {
    pub fn new(id: NodeId) -> MemberConfiguration {
        MemberConfiguration {
            id,
            votes: true,
            priority: 1,
            hidden: false,
        }
    }

    pub fn with_priority(id: NodeId, priority: u32) -> MemberConfiguration {
        MemberConfiguration {
            priority,
            ..MemberConfiguration::new(id)
        }
    }

    /// Passive member: no vote, never stands for election.
    pub fn non_voting(id: NodeId) -> MemberConfiguration {
        MemberConfiguration {
            id,
            votes: false,
            priority: 0,
            hidden: true,
        }
    }

    pub fn is_electable(&self) -> bool {
        self.votes && !self.hidden && self.priority > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterConfiguration {
    pub version: u64,
    pub members: Vec<MemberConfiguration>,
    pub settings: ElectionSettings,
}

impl ClusterConfiguration {
    pub fn new(version: u64, members: Vec<MemberConfiguration>) -> ClusterConfiguration {
        ClusterConfiguration {
            version,
            members,
            settings: ElectionSettings::default(),
        }
    }

    pub fn with_nodes(nodes: Vec<NodeId>) -> ClusterConfiguration {
        ClusterConfiguration::new(1, nodes.into_iter().map(MemberConfiguration::new).collect())
    }

    pub fn member(&self, node_id: NodeId) -> Option<&MemberConfiguration> {
        self.members.iter().find(|m| m.id == node_id)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.member(node_id).is_some()
    }

    pub fn voter_count(&self) -> usize {
        self.members.iter().filter(|m| m.votes).count()
    }

    /// Majority of the voting members.
    pub fn quorum_size(&self) -> usize {
        self.voter_count() / 2 + 1
    }

    pub fn peers(&self, node_id: NodeId) -> Vec<NodeId> {
        self.members
            .iter()
            .filter(|m| m.id != node_id)
            .map(|m| m.id)
            .collect()
    }

    pub fn voting_peers(&self, node_id: NodeId) -> Vec<NodeId> {
        self.members
            .iter()
            .filter(|m| m.id != node_id && m.votes)
            .map(|m| m.id)
            .collect()
    }

    pub fn is_electable(&self, node_id: NodeId) -> bool {
        self.member(node_id).map_or(false, |m| m.is_electable())
    }

    /// Number of electable voting members with a strictly higher priority than `priority`.
    pub fn priority_rank(&self, priority: u32) -> u32 {
        self.members
            .iter()
            .filter(|m| m.is_electable() && m.priority > priority)
            .count() as u32
    }

    pub fn priority_takeover_delay(&self, node_id: NodeId) -> Duration {
        let priority = self.member(node_id).map_or(0, |m| m.priority);
        let rank = self.priority_rank(priority);

        self.settings.priority_takeover_delay_step * (rank + 1)
    }
}

/// Configuration provider. Supplies the member list and learns about newer versions
/// observed through heartbeats.
pub trait Cluster: Send + Sync + Clone + 'static {
    fn configuration(&self) -> ClusterConfiguration;

    fn report_newer_configuration(&self, from: NodeId, version: u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_counts_only_voters() {
        let config = ClusterConfiguration::new(
            1,
            vec![
                MemberConfiguration::new(1),
                MemberConfiguration::new(2),
                MemberConfiguration::non_voting(3),
            ],
        );

        assert_eq!(2, config.voter_count());
        assert_eq!(2, config.quorum_size());
        assert_eq!(vec![2], config.voting_peers(1));
        assert_eq!(vec![2, 3], config.peers(1));
    }

    #[test]
    fn test_electability() {
        let config = ClusterConfiguration::new(
            1,
            vec![
                MemberConfiguration::new(1),
                MemberConfiguration::with_priority(2, 0),
                MemberConfiguration::non_voting(3),
            ],
        );

        assert!(config.is_electable(1));
        assert!(!config.is_electable(2));
        assert!(!config.is_electable(3));
        assert!(!config.is_electable(4));
    }

    #[test]
    fn test_priority_takeover_delay_grows_with_rank() {
        let mut config = ClusterConfiguration::new(
            1,
            vec![
                MemberConfiguration::with_priority(1, 3),
                MemberConfiguration::with_priority(2, 2),
                MemberConfiguration::new(3),
            ],
        );
        config.settings = ElectionSettings::with_election_timeout(Duration::from_secs(10));

        assert_eq!(Duration::from_secs(5), config.priority_takeover_delay(1));
        assert_eq!(Duration::from_secs(10), config.priority_takeover_delay(2));
        assert_eq!(Duration::from_secs(15), config.priority_takeover_delay(3));
    }

    #[test]
    fn test_freshness_window_same_second() {
        let window = FreshnessWindow::default();
        let latest = Position::new(100, 5000, 0);

        assert!(!window.is_close_enough(Position::new(100, 3999, 0), latest));
        assert!(window.is_close_enough(Position::new(100, 4000, 0), latest));
    }

    #[test]
    fn test_freshness_window_different_seconds() {
        let window = FreshnessWindow::default();
        let latest = Position::new(100, 0, 0);

        assert!(!window.is_close_enough(Position::new(97, 0, 0), latest));
        assert!(window.is_close_enough(Position::new(98, 0, 0), latest));
        assert!(window.is_close_enough(Position::new(101, 0, 0), latest));
    }
}
