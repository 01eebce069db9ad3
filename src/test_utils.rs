use parking_lot::Mutex;

use crate::common::Term;
use crate::errors::{new_err, ErrorKind, RaftError};
use crate::node::state::{LastVote, NodeStateStore};

/// In-memory store that remembers every write and can be told to fail.
#[derive(Debug, Default)]
pub struct MockNodeStateStore {
    pub terms: Mutex<Vec<Term>>,
    pub votes: Mutex<Vec<LastVote>>,
    pub fail_writes: Mutex<bool>,
}

impl MockNodeStateStore {
    pub fn with_state(term: Term, vote: Option<LastVote>) -> MockNodeStateStore {
        let store = MockNodeStateStore::default();
        store.terms.lock().push(term);
        if let Some(vote) = vote {
            store.votes.lock().push(vote);
        }
        store
    }

    pub fn saved_terms(&self) -> Vec<Term> {
        self.terms.lock().clone()
    }

    pub fn saved_votes(&self) -> Vec<LastVote> {
        self.votes.lock().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    fn check_writable(&self) -> Result<(), RaftError> {
        if *self.fail_writes.lock() {
            return new_err(ErrorKind::Storage, "mock store write failure".to_string(), String::new());
        }
        Ok(())
    }
}

impl NodeStateStore for MockNodeStateStore {
    fn load_last_vote(&self) -> Result<Option<LastVote>, RaftError> {
        Ok(self.votes.lock().last().cloned())
    }

    fn save_last_vote(&self, vote: LastVote) -> Result<(), RaftError> {
        self.check_writable()?;
        self.votes.lock().push(vote);
        Ok(())
    }

    fn load_current_term(&self) -> Result<Term, RaftError> {
        Ok(self.terms.lock().last().cloned().unwrap_or(0))
    }

    fn save_current_term(&self, term: Term) -> Result<(), RaftError> {
        self.check_writable()?;
        self.terms.lock().push(term);
        Ok(())
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
