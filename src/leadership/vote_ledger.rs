use parking_lot::Mutex;
use std::sync::Arc;

use crate::common::{NodeId, Term};
use crate::errors::{new_err, ErrorKind, Result};
use crate::node::state::{LastVote, NodeStateStore};

/// Durable `(term, candidate)` record guarding the one-vote-per-term rule.
#[derive(Debug)]
pub struct VoteLedger<Ns: NodeStateStore> {
    last_vote: Mutex<Option<LastVote>>,
    store: Arc<Ns>,
}

impl<Ns: NodeStateStore> VoteLedger<Ns> {
    pub fn load(store: Arc<Ns>) -> Result<VoteLedger<Ns>> {
        let last_vote = store.load_last_vote()?;

        Ok(VoteLedger {
            last_vote: Mutex::new(last_vote),
            store,
        })
    }

    pub fn last_vote(&self) -> Option<LastVote> {
        *self.last_vote.lock()
    }

    /// Records a vote. The store is flushed before the cache changes, so a vote that was
    /// reported as recorded is durable.
    pub fn record_vote(&self, term: Term, candidate_id: NodeId) -> Result<()> {
        let mut last_vote = self.last_vote.lock();

        if let Some(recorded) = *last_vote {
            if term < recorded.term {
                return new_err(
                    ErrorKind::StaleTerm,
                    format!("cannot vote in term {}", term),
                    format!("already voted in term {}", recorded.term),
                );
            }
            if term == recorded.term {
                if candidate_id == recorded.candidate_id {
                    return Ok(());
                }
                return new_err(
                    ErrorKind::AlreadyVotedDifferently,
                    format!("cannot vote for Node {} in term {}", candidate_id, term),
                    format!("already voted for Node {}", recorded.candidate_id),
                );
            }
        }

        let vote = LastVote { term, candidate_id };
        self.store.save_last_vote(vote)?;
        *last_vote = Some(vote);

        debug!("Vote recorded: {}", vote);
        Ok(())
    }
}
