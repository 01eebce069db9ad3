use parking_lot::Mutex;
use raft::{LogApplier, NodeHandle, Term};
use std::sync::Arc;

/// Log applier without a log: it has nothing to drain, so once a node handle is attached it
/// reports the drain as complete right away.
#[derive(Clone, Debug, Default)]
pub struct MemoryLogApplier {
    drained_terms: Arc<Mutex<Vec<Term>>>,
    node_handle: Arc<Mutex<Option<NodeHandle>>>,
}

impl MemoryLogApplier {
    pub fn new() -> MemoryLogApplier {
        MemoryLogApplier::default()
    }

    /// Attaches the node to report drain completion to. A drain entered before the node was
    /// attached is reported here; a repeated signal for the same term is ignored by the node.
    pub fn attach(&self, node_handle: NodeHandle) {
        *self.node_handle.lock() = Some(node_handle.clone());

        let pending = self.drained_terms.lock().last().copied();
        if let Some(term) = pending {
            signal_drain_complete(&node_handle, term);
        }
    }

    /// Terms in which drain mode was entered, oldest first.
    pub fn drained_terms(&self) -> Vec<Term> {
        self.drained_terms.lock().clone()
    }
}

impl LogApplier for MemoryLogApplier {
    fn drain_mode_entered(&self, term: Term) {
        self.drained_terms.lock().push(term);

        if let Some(handle) = self.node_handle.lock().as_ref() {
            signal_drain_complete(handle, term);
        }
    }
}

fn signal_drain_complete(handle: &NodeHandle, term: Term) {
    if let Err(err) = handle.signal_drain_complete(term) {
        warn!(
            "Node {} drain completion for term {} not delivered: {}",
            handle.node_id(),
            term,
            err
        );
    }
}
