use parking_lot::Mutex;
use raft::{LastVote, NodeStateStore, RaftError, Term};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default)]
struct StoredState {
    current_term: Term,
    last_vote: Option<LastVote>,
}

/// In-memory election state store. Clones share the state, so a restarted node can be handed
/// the store of its previous incarnation.
#[derive(Clone, Debug, Default)]
pub struct MemoryNodeStateStore {
    state: Arc<Mutex<StoredState>>,
}

impl MemoryNodeStateStore {
    pub fn new() -> MemoryNodeStateStore {
        MemoryNodeStateStore::default()
    }

    pub fn with_state(current_term: Term, last_vote: Option<LastVote>) -> MemoryNodeStateStore {
        MemoryNodeStateStore {
            state: Arc::new(Mutex::new(StoredState {
                current_term,
                last_vote,
            })),
        }
    }
}

impl NodeStateStore for MemoryNodeStateStore {
    fn load_last_vote(&self) -> Result<Option<LastVote>, RaftError> {
        Ok(self.state.lock().last_vote)
    }

    fn save_last_vote(&self, vote: LastVote) -> Result<(), RaftError> {
        debug!("Vote saved: {}", vote);
        self.state.lock().last_vote = Some(vote);

        Ok(())
    }

    fn load_current_term(&self) -> Result<Term, RaftError> {
        Ok(self.state.lock().current_term)
    }

    fn save_current_term(&self, term: Term) -> Result<(), RaftError> {
        debug!("Term saved: {}", term);
        self.state.lock().current_term = term;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let store = MemoryNodeStateStore::new();
        let restarted = store.clone();

        store.save_current_term(3).unwrap();
        store
            .save_last_vote(LastVote { term: 3, candidate_id: 2 })
            .unwrap();

        assert_eq!(3, restarted.load_current_term().unwrap());
        assert_eq!(
            Some(LastVote { term: 3, candidate_id: 2 }),
            restarted.load_last_vote().unwrap()
        );
    }
}
