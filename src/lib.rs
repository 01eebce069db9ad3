#![warn(missing_debug_implementations, unsafe_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
#[macro_use]
extern crate derive_more;

mod catch_up;
mod common;
mod communication;
mod configuration;
mod errors;
mod leadership;
mod node;
mod operation_log;
mod workers;

#[cfg(test)]
mod test_utils;

pub use catch_up::CatchUpOutcome;
pub use common::cancellation::CancellationToken;
pub use common::clock::{Clock, ManualClock, SystemClock};
pub use common::{NodeId, Term};
pub use communication::peers::{
    FreshnessResponse, HeartbeatResponse, PeerRequestHandler, ReportedRole, VoteRequest,
    VoteResponse,
};
pub use configuration::cluster::{
    Cluster, ClusterConfiguration, ElectionSettings, FreshnessWindow, MemberConfiguration,
    MIN_ELECTION_TIMEOUT,
};
pub use configuration::node::{NodeConfiguration, NodeLimits};
pub use errors::{new_err, ErrorKind, RaftError};
pub use leadership::election_timer::{offset_upper_bound, ElectionTimer, RandomizedElectionTimer};
pub use leadership::status::{ApplierState, ElectionReason, LeaderPhase, Role};
pub use leadership::term::TermUpdate;
pub use node::coordinator::{CoordinatorCommand, ElectionCoordinator, NodeStatus};
pub use node::handle::NodeHandle;
pub use node::state::{LastVote, NodeStateStore};
pub use operation_log::{LogApplier, Position, Timestamp};
pub type NodeWorker = common::RaftWorker;

/// Starts a node. Fails when the durable election state cannot be loaded.
pub fn start_node<Ns, Pc, Et, Cl, La, Ck>(
    node_config: NodeConfiguration<Ns, Pc, Et, Cl, La, Ck>,
) -> Result<(NodeWorker, NodeHandle), RaftError>
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    node::start_node(node_config)
}
