#[macro_use]
extern crate log;
extern crate raft;

mod cluster;
mod communication;
mod election;
mod memory_log_applier;
mod node;

pub use cluster::SharedClusterConfiguration;
pub use communication::inproc_peer_communicator::{InProcNetwork, InProcPeerCommunicator};
pub use election::fixed_election_timer::FixedElectionTimer;
pub use memory_log_applier::MemoryLogApplier;
pub use node::MemoryNodeStateStore;
