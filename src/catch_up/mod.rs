use std::collections::HashSet;
use std::time::Instant;

use crate::common::cancellation::CancellationToken;
use crate::common::{NodeId, Term};
use crate::errors::RaftError;
use crate::operation_log::Position;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum CatchUpOutcome {
    /// No scanned peer is ahead of us.
    #[display(fmt = "most up-to-date")]
    SkippedMostUpToDate,
    /// Reached the freshest scanned position before the deadline.
    #[display(fmt = "finished")]
    Finished,
    #[display(fmt = "timed out")]
    TimedOut,
    /// No peer answered the freshness scan.
    #[display(fmt = "unreachable")]
    Unreachable,
}

#[derive(Debug)]
enum CatchUpState {
    Scanning {
        pending: HashSet<NodeId>,
        freshest: Option<Position>,
        answered: usize,
    },
    WaitingForApplied {
        target: Position,
    },
}

/// Post-election catch-up of a new leader: a one-shot freshness scan, then waiting for the
/// local applied position to reach the freshest one found. One deadline bounds both steps.
#[derive(Debug)]
pub struct CatchUpController {
    term: Term,
    deadline: Instant,
    cancellation: CancellationToken,
    state: CatchUpState,
    errors: Vec<RaftError>,
}

impl CatchUpController {
    pub fn start(term: Term, peers: Vec<NodeId>, deadline: Instant) -> CatchUpController {
        CatchUpController {
            term,
            deadline,
            cancellation: CancellationToken::new(),
            state: CatchUpState::Scanning {
                pending: peers.into_iter().collect(),
                freshest: None,
                answered: 0,
            },
            errors: Vec::new(),
        }
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Position the leader is waiting for, once the scan found a peer ahead.
    pub fn target(&self) -> Option<Position> {
        match self.state {
            CatchUpState::WaitingForApplied { target } => Some(target),
            CatchUpState::Scanning { .. } => None,
        }
    }

    /// Scan failures, reported when nobody answered.
    pub fn take_errors(&mut self) -> Vec<RaftError> {
        std::mem::replace(&mut self.errors, Vec::new())
    }

    pub fn on_freshness_response(&mut self, peer_id: NodeId, applied: Position) {
        if let CatchUpState::Scanning {
            pending,
            freshest,
            answered,
        } = &mut self.state
        {
            if pending.remove(&peer_id) {
                *answered += 1;
                *freshest = (*freshest).max(Some(applied));
            }
        }
    }

    pub fn on_freshness_failure(&mut self, peer_id: NodeId, err: RaftError) {
        if let CatchUpState::Scanning { pending, .. } = &mut self.state {
            if pending.remove(&peer_id) {
                self.errors.push(err);
            }
        }
    }

    /// Advances the controller. Returns the outcome once catch-up is over.
    pub fn poll(&mut self, my_applied: Position, now: Instant) -> Option<CatchUpOutcome> {
        let scan = match &self.state {
            CatchUpState::Scanning {
                pending,
                freshest,
                answered,
            } => Some((pending.is_empty(), *freshest, *answered)),
            CatchUpState::WaitingForApplied { .. } => None,
        };

        if let Some((scan_complete, freshest, answered)) = scan {
            if scan_complete {
                match freshest {
                    None if !self.errors.is_empty() => {
                        return Some(self.finish(CatchUpOutcome::Unreachable))
                    }
                    Some(target) if target > my_applied => {
                        debug!(
                            "Catch-up target for term {} is {}, my position is {}",
                            self.term, target, my_applied
                        );
                        self.state = CatchUpState::WaitingForApplied { target };
                    }
                    _ => return Some(self.finish(CatchUpOutcome::SkippedMostUpToDate)),
                }
            } else if now >= self.deadline {
                let outcome = match freshest {
                    _ if answered == 0 => CatchUpOutcome::Unreachable,
                    Some(latest) if latest <= my_applied => CatchUpOutcome::SkippedMostUpToDate,
                    _ => CatchUpOutcome::TimedOut,
                };
                return Some(self.finish(outcome));
            } else {
                return None;
            }
        }

        if let CatchUpState::WaitingForApplied { target } = self.state {
            if my_applied >= target {
                return Some(self.finish(CatchUpOutcome::Finished));
            }
            if now >= self.deadline {
                return Some(self.finish(CatchUpOutcome::TimedOut));
            }
        }

        None
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    fn finish(&mut self, outcome: CatchUpOutcome) -> CatchUpOutcome {
        self.cancellation.cancel();
        outcome
    }
}
