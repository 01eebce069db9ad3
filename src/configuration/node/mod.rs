use std::time::Duration;

use crate::common::clock::Clock;
use crate::common::NodeId;
use crate::communication::peers::PeerRequestHandler;
use crate::configuration::cluster::Cluster;
use crate::leadership::election_timer::ElectionTimer;
use crate::node::state::NodeStateStore;
use crate::operation_log::{LogApplier, Position};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeLimits {
    /// Upper bound for a synchronous request made through the node handle.
    pub handle_request_timeout: Duration,
    /// Longest sleep of the election worker when no deadline is pending.
    pub idle_poll_interval: Duration,
}

impl Default for NodeLimits {
    fn default() -> Self {
        NodeLimits {
            handle_request_timeout: Duration::from_millis(1000),
            idle_poll_interval: Duration::from_millis(500),
        }
    }
}

/// Everything a node needs to run the election core: its identity, initial log positions
/// and the collaborators.
#[derive(Debug)]
pub struct NodeConfiguration<Ns, Pc, Et, Cl, La, Ck>
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    pub node_id: NodeId,
    pub last_applied: Position,
    pub last_durable: Position,
    pub cluster: Cl,
    pub peer_communicator: Pc,
    pub election_timer: Et,
    pub state_store: Ns,
    pub log_applier: La,
    pub clock: Ck,
    pub limits: NodeLimits,
}
