use std::collections::HashSet;
use std::time::Instant;

use crate::common::cancellation::CancellationToken;
use crate::common::{NodeId, QuorumResponse, Term};
use crate::errors::RaftError;
use crate::leadership::status::ElectionReason;
use crate::communication::peers::VoteResponse;

/// One vote fan-out, dry-run or real. Lives until its tally finishes.
#[derive(Clone, Debug)]
pub struct ElectionAttempt {
    pub id: u64,
    pub term: Term,
    pub dry_run: bool,
    pub reason: ElectionReason,
    pub started_at: Instant,
    pub cancellation: CancellationToken,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttemptOutcome {
    Won,
    Lost,
    Superseded(Term),
    Cancelled,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TallyState {
    Gathering,
    Finished(AttemptOutcome),
}

/// Counts the votes of one attempt. The candidate's own vote is counted up front.
#[derive(Debug)]
pub struct VoteRequester {
    attempt: ElectionAttempt,
    quorum_size: usize,
    voter_count: usize,
    granted: HashSet<NodeId>,
    refused: HashSet<NodeId>,
    errors: Vec<RaftError>,
    state: TallyState,
}

impl VoteRequester {
    pub fn new(
        attempt: ElectionAttempt,
        node_id: NodeId,
        voter_count: usize,
        quorum_size: usize,
    ) -> VoteRequester {
        let mut granted = HashSet::new();
        granted.insert(node_id);

        let mut requester = VoteRequester {
            attempt,
            quorum_size,
            voter_count,
            granted,
            refused: HashSet::new(),
            errors: Vec::new(),
            state: TallyState::Gathering,
        };
        requester.evaluate();

        requester
    }

    pub fn attempt(&self) -> &ElectionAttempt {
        &self.attempt
    }

    pub fn state(&self) -> TallyState {
        self.state
    }

    pub fn granted_votes(&self) -> usize {
        self.granted.len()
    }

    /// Failed requests, kept for the loss report.
    pub fn errors(&self) -> &[RaftError] {
        &self.errors
    }

    pub fn on_response(&mut self, response: VoteResponse) -> TallyState {
        if self.state != TallyState::Gathering || self.has_answered(response.peer_id) {
            return self.state;
        }

        if response.term > self.attempt.term {
            self.finish(AttemptOutcome::Superseded(response.term));
            return self.state;
        }

        if response.result() {
            self.granted.insert(response.peer_id);
        } else {
            debug!(
                "Node {} refused the vote for term {}: {}",
                response.peer_id, self.attempt.term, response.reason
            );
            self.refused.insert(response.peer_id);
        }
        self.evaluate();

        self.state
    }

    pub fn on_failure(&mut self, peer_id: NodeId, err: RaftError) -> TallyState {
        if self.state != TallyState::Gathering || self.has_answered(peer_id) {
            return self.state;
        }

        self.refused.insert(peer_id);
        self.errors.push(err);
        self.evaluate();

        self.state
    }

    /// Ends the attempt from outside. Responses still in flight are dropped.
    pub fn cancel(&mut self) {
        if self.state == TallyState::Gathering {
            self.finish(AttemptOutcome::Cancelled);
        }
    }

    fn has_answered(&self, peer_id: NodeId) -> bool {
        self.granted.contains(&peer_id) || self.refused.contains(&peer_id)
    }

    fn evaluate(&mut self) {
        if self.granted.len() >= self.quorum_size {
            self.finish(AttemptOutcome::Won);
        } else if self.refused.len() > self.voter_count.saturating_sub(self.quorum_size) {
            self.finish(AttemptOutcome::Lost);
        }
    }

    fn finish(&mut self, outcome: AttemptOutcome) {
        self.attempt.cancellation.cancel();
        self.state = TallyState::Finished(outcome);
    }
}
