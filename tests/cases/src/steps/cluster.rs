use election_modules::{InProcNetwork, MemoryLogApplier, SharedClusterConfiguration};
use raft::{ClusterConfiguration, NodeHandle, NodeId, NodeStatus, NodeWorker};
use std::collections::HashMap;
use std::time::Duration;

use super::wait_for;

pub struct CaseNode {
    pub id: NodeId,
    pub worker: NodeWorker,
    pub handle: NodeHandle,
    pub log_applier: MemoryLogApplier,
}

pub struct CaseCluster {
    pub network: InProcNetwork,
    pub cluster: SharedClusterConfiguration,
    pub nodes: Vec<CaseNode>,
}

pub fn start_initial_cluster<F>(configuration: ClusterConfiguration, node_creator: F) -> CaseCluster
where
    F: Fn(NodeId, SharedClusterConfiguration, &InProcNetwork) -> CaseNode,
{
    let network = InProcNetwork::new();
    let node_ids: Vec<NodeId> = configuration.members.iter().map(|m| m.id).collect();
    let cluster = SharedClusterConfiguration::new(configuration);

    let nodes = node_ids
        .into_iter()
        .map(|node_id| node_creator(node_id, cluster.clone(), &network))
        .collect();

    CaseCluster {
        network,
        cluster,
        nodes,
    }
}

impl CaseCluster {
    pub fn handle(&self, node_id: NodeId) -> &NodeHandle {
        &self
            .nodes
            .iter()
            .find(|node| node.id == node_id)
            .expect("node exists")
            .handle
    }

    pub fn statuses(&self) -> Vec<NodeStatus> {
        self.nodes.iter().map(|node| node.handle.status()).collect()
    }

    /// Nodes currently reporting a leader role, in any phase.
    pub fn leaders(&self) -> Vec<NodeId> {
        self.statuses()
            .into_iter()
            .filter(|status| status.role.is_leader())
            .map(|status| status.node_id)
            .collect()
    }

    pub fn writable_leader(&self) -> Option<NodeId> {
        let writable: Vec<NodeId> = self
            .statuses()
            .into_iter()
            .filter(|status| status.can_accept_writes)
            .map(|status| status.node_id)
            .collect();

        assert!(writable.len() <= 1, "several writable leaders: {:?}", writable);

        writable.first().copied()
    }

    pub fn wait_for_writable_leader(&self, timeout: Duration) -> Option<NodeId> {
        if wait_for(timeout, || self.writable_leader().is_some()) {
            return self.writable_leader();
        }

        None
    }

    /// Checks that no two nodes claim leadership within the same term.
    pub fn assert_single_leader_per_term(&self) {
        let mut leaders_by_term: HashMap<u64, NodeId> = HashMap::new();
        for status in self.statuses() {
            if !status.role.is_leader() {
                continue;
            }

            if let Some(other) = leaders_by_term.insert(status.term, status.node_id) {
                panic!(
                    "Node {} and Node {} both lead term {}",
                    other, status.node_id, status.term
                );
            }
        }
    }

    pub fn terminate(self) {
        let mut handles = Vec::new();
        for node in self.nodes {
            self.network.unregister(node.id);

            let result = node.worker.terminate_worker_tx.send(());
            if result.is_err() {
                panic!("worker panicked!")
            }
            handles.push(node.worker.join_handle);
        }

        for handle in handles {
            if handle.join().is_err() {
                panic!("worker panicked!")
            }
        }
    }
}
