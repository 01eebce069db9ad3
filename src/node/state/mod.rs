use crate::common::{NodeId, Term};
use crate::errors::RaftError;

/// Durable record of the most recent vote this node cast.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[display(fmt = "LastVote(term={}, candidate={})", term, candidate_id)]
pub struct LastVote {
    pub term: Term,
    pub candidate_id: NodeId,
}

/// Durable store for the election state. A `save_*` call returns only once the value
/// is flushed.
pub trait NodeStateStore: Send + Sync + 'static {
    fn load_last_vote(&self) -> Result<Option<LastVote>, RaftError>;
    fn save_last_vote(&self, vote: LastVote) -> Result<(), RaftError>;

    fn load_current_term(&self) -> Result<Term, RaftError>;
    fn save_current_term(&self, term: Term) -> Result<(), RaftError>;
}
