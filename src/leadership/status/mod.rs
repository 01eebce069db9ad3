use crossbeam_channel::Sender;

use crate::common::{NodeId, Term};
use crate::communication::peers::{
    FreshnessResponse, HeartbeatResponse, ReportedRole, VoteRequest, VoteResponse,
};
use crate::configuration::cluster::ClusterConfiguration;
use crate::errors::RaftError;
use crate::leadership::term::TermUpdate;
use crate::operation_log::Position;

pub mod administrator;
pub mod node_leadership_fsm;

/// Progress of a freshly elected leader towards accepting writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum LeaderPhase {
    CatchingUp,
    Draining,
    Active,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum Role {
    Follower,
    #[display(fmt = "Candidate(dry_run={})", dry_run)]
    Candidate { dry_run: bool },
    #[display(fmt = "Leader({})", _0)]
    Leader(LeaderPhase),
    Rollback,
}

impl Role {
    pub fn is_leader(&self) -> bool {
        matches!(self, Role::Leader(_))
    }

    pub fn reported_role(&self) -> ReportedRole {
        match self {
            Role::Leader(_) => ReportedRole::Primary,
            Role::Follower | Role::Candidate { .. } => ReportedRole::Secondary,
            Role::Rollback => ReportedRole::Rollback,
        }
    }

    pub fn applier_state(&self) -> ApplierState {
        match self {
            Role::Leader(LeaderPhase::Draining) => ApplierState::Draining,
            Role::Leader(LeaderPhase::Active) => ApplierState::Stopped,
            _ => ApplierState::Running,
        }
    }
}

/// Applier-facing view of the leader phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ApplierState {
    Running,
    Draining,
    Stopped,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
pub enum ElectionReason {
    #[display(fmt = "election timeout")]
    ElectionTimeout,
    #[display(fmt = "priority takeover")]
    PriorityTakeover,
    #[display(fmt = "single node election")]
    SingleNode,
}

/// Everything the election worker applies, in arrival order.
#[derive(Debug)]
pub enum ElectionEvent {
    VoteResponseReceived {
        attempt_id: u64,
        peer_id: NodeId,
        result: Result<VoteResponse, RaftError>,
    },
    FreshnessResponseReceived {
        term: Term,
        peer_id: NodeId,
        result: Result<FreshnessResponse, RaftError>,
    },
    HeartbeatReceived(HeartbeatResponse),
    HeartbeatFailed(NodeId),
    VoteRequested {
        request: VoteRequest,
        reply_tx: Sender<VoteResponse>,
    },
    HeartbeatRequested {
        reply_tx: Sender<HeartbeatResponse>,
    },
    FreshnessRequested {
        reply_tx: Sender<FreshnessResponse>,
    },
    UpdateTerm {
        term: Term,
        reply_tx: Sender<Result<TermUpdate, RaftError>>,
    },
    StepDownRequested {
        reply_tx: Sender<Result<(), RaftError>>,
    },
    DrainComplete(Term),
    AppliedAdvanced(Position),
    DurableAdvanced(Position),
    ReconfigurationStarted {
        reply_tx: Sender<Result<(), RaftError>>,
    },
    ConfigurationInstalled(ClusterConfiguration),
    RollbackStarted {
        reply_tx: Sender<Result<(), RaftError>>,
    },
    RollbackFinished {
        reply_tx: Sender<Result<(), RaftError>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_role_and_applier_state() {
        let cases = vec![
            (Role::Follower, ReportedRole::Secondary, ApplierState::Running),
            (Role::Candidate { dry_run: true }, ReportedRole::Secondary, ApplierState::Running),
            (Role::Leader(LeaderPhase::CatchingUp), ReportedRole::Primary, ApplierState::Running),
            (Role::Leader(LeaderPhase::Draining), ReportedRole::Primary, ApplierState::Draining),
            (Role::Leader(LeaderPhase::Active), ReportedRole::Primary, ApplierState::Stopped),
            (Role::Rollback, ReportedRole::Rollback, ApplierState::Running),
        ];

        for (role, reported, applier) in cases {
            assert_eq!(reported, role.reported_role(), "{}", role);
            assert_eq!(applier, role.applier_state(), "{}", role);
        }
    }
}
