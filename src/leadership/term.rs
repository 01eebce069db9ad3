use parking_lot::Mutex;
use std::sync::Arc;

use crate::common::Term;
use crate::errors::Result;
use crate::node::state::NodeStateStore;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TermUpdate {
    pub accepted: bool,
    pub current_term: Term,
}

/// Owner of the current term. Advancing is a compare-and-set: the comparison and the durable
/// write happen under one lock, so concurrent callers observe a single winner and the store
/// never sees the term go backwards.
#[derive(Debug)]
pub struct TermManager<Ns: NodeStateStore> {
    current_term: Mutex<Term>,
    store: Arc<Ns>,
}

impl<Ns: NodeStateStore> TermManager<Ns> {
    pub fn load(store: Arc<Ns>) -> Result<TermManager<Ns>> {
        let current_term = store.load_current_term()?;

        Ok(TermManager {
            current_term: Mutex::new(current_term),
            store,
        })
    }

    pub fn current_term(&self) -> Term {
        *self.current_term.lock()
    }

    pub fn try_advance_term(&self, candidate_term: Term) -> Result<TermUpdate> {
        let mut current_term = self.current_term.lock();
        if candidate_term <= *current_term {
            return Ok(TermUpdate {
                accepted: false,
                current_term: *current_term,
            });
        }

        self.store.save_current_term(candidate_term)?;
        debug!("Term advanced from {} to {}", *current_term, candidate_term);
        *current_term = candidate_term;

        Ok(TermUpdate {
            accepted: true,
            current_term: candidate_term,
        })
    }
}
