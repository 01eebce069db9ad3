use crate::common::{NodeId, Term};
use crate::communication::peers::{VoteRequest, VoteResponse};
use crate::leadership::vote_ledger::VoteLedger;
use crate::node::state::NodeStateStore;
use crate::operation_log::Position;

/// Voter state a vote request is judged against. The term is already advanced when the
/// request carried a newer one.
#[derive(Clone, Copy, Debug)]
pub struct VoterState {
    pub node_id: NodeId,
    pub current_term: Term,
    pub config_version: u64,
    pub last_applied: Position,
}

/// Decides a vote request. Dry-run requests never write to the ledger.
pub fn process_vote_request<Ns: NodeStateStore>(
    request: &VoteRequest,
    voter: &VoterState,
    ledger: &VoteLedger<Ns>,
) -> VoteResponse {
    let refusal = |reason: String| VoteResponse {
        peer_id: voter.node_id,
        term: voter.current_term,
        vote_granted: false,
        reason,
    };

    if request.term < voter.current_term {
        return refusal(format!(
            "candidate's term ({}) is lower than mine ({})",
            request.term, voter.current_term
        ));
    }

    if request.config_version != voter.config_version {
        return refusal(format!(
            "candidate's config version ({}) differs from mine ({})",
            request.config_version, voter.config_version
        ));
    }

    if request.last_applied < voter.last_applied {
        return refusal(format!(
            "candidate's data is staler than mine. candidate's last applied: {}, my last applied: {}",
            request.last_applied, voter.last_applied
        ));
    }

    if !request.dry_run {
        if let Err(err) = ledger.record_vote(request.term, request.candidate_id) {
            return refusal(format!(
                "cannot record the vote for Node {} in term {}: {}",
                request.candidate_id, request.term, err
            ));
        }
    }

    trace!(
        "Node {} granted the vote to Node {} for term {} (dry_run={})",
        voter.node_id,
        request.candidate_id,
        request.term,
        request.dry_run
    );
    VoteResponse {
        peer_id: voter.node_id,
        term: voter.current_term,
        vote_granted: true,
        reason: String::new(),
    }
}
