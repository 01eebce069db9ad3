use crate::common::{NodeId, QuorumResponse, Term};
use crate::errors::RaftError;
use crate::operation_log::Position;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Vote request: term={} candidate={} config_version={} last_applied={} dry_run={}",
    term,
    candidate_id,
    config_version,
    last_applied,
    dry_run
)]
pub struct VoteRequest {
    pub term: Term,
    pub candidate_id: NodeId,
    pub config_version: u64,
    pub last_applied: Position,
    pub dry_run: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Vote response: peer={} term={} granted={} reason='{}'",
    peer_id,
    term,
    vote_granted,
    reason
)]
pub struct VoteResponse {
    pub peer_id: NodeId,
    pub term: Term,
    pub vote_granted: bool,
    pub reason: String,
}

impl QuorumResponse for VoteResponse {
    fn result(&self) -> bool {
        self.vote_granted
    }
}

/// Role a node advertises about itself in heartbeat replies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ReportedRole {
    #[display(fmt = "PRIMARY")]
    Primary,
    #[display(fmt = "SECONDARY")]
    Secondary,
    #[display(fmt = "ROLLBACK")]
    Rollback,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(
    fmt = "Heartbeat response: peer={} role={} term={} applied={} config_version={}",
    peer_id,
    role,
    term,
    applied,
    config_version
)]
pub struct HeartbeatResponse {
    pub peer_id: NodeId,
    pub role: ReportedRole,
    pub term: Term,
    pub applied: Position,
    pub durable: Position,
    pub config_version: u64,
}

/// Reply to the freshness scan a new primary issues before accepting writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "Freshness response: peer={} applied={}", peer_id, applied)]
pub struct FreshnessResponse {
    pub peer_id: NodeId,
    pub applied: Position,
}

/// Transport used by the election core. Every call returns within the transport's own
/// timeout with either a response or an error.
pub trait PeerRequestHandler: Send + Sync + Clone + 'static {
    fn send_vote_request(
        &self,
        destination_node_id: NodeId,
        request: VoteRequest,
    ) -> Result<VoteResponse, RaftError>;

    fn send_freshness_request(
        &self,
        destination_node_id: NodeId,
    ) -> Result<FreshnessResponse, RaftError>;

    fn send_heartbeat(&self, destination_node_id: NodeId) -> Result<HeartbeatResponse, RaftError>;
}
