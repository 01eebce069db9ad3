use parking_lot::RwLock;
use raft::{
    new_err, ErrorKind, FreshnessResponse, HeartbeatResponse, NodeHandle, NodeId,
    PeerRequestHandler, RaftError, VoteRequest, VoteResponse,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Default)]
struct NetworkState {
    nodes: HashMap<NodeId, NodeHandle>,
    isolated: HashSet<NodeId>,
}

/// Registry of the running nodes of an in-process cluster. Nodes can be cut off and
/// reconnected to simulate partitions.
#[derive(Clone, Debug, Default)]
pub struct InProcNetwork {
    state: Arc<RwLock<NetworkState>>,
}

impl InProcNetwork {
    pub fn new() -> InProcNetwork {
        InProcNetwork::default()
    }

    pub fn register(&self, node_handle: NodeHandle) {
        self.state
            .write()
            .nodes
            .insert(node_handle.node_id(), node_handle);
    }

    pub fn unregister(&self, node_id: NodeId) {
        self.state.write().nodes.remove(&node_id);
    }

    pub fn isolate(&self, node_id: NodeId) {
        info!("Node {} isolated from the network", node_id);
        self.state.write().isolated.insert(node_id);
    }

    pub fn reconnect(&self, node_id: NodeId) {
        info!("Node {} reconnected to the network", node_id);
        self.state.write().isolated.remove(&node_id);
    }

    /// Transport used by `node_id` to reach its peers.
    pub fn communicator(&self, node_id: NodeId) -> InProcPeerCommunicator {
        InProcPeerCommunicator {
            source_node_id: node_id,
            network: self.clone(),
        }
    }

    fn route(&self, source_node_id: NodeId, destination_node_id: NodeId) -> Result<NodeHandle, RaftError> {
        let state = self.state.read();

        if state.isolated.contains(&source_node_id) || state.isolated.contains(&destination_node_id) {
            return new_err(
                ErrorKind::Communication,
                format!("Node {} cannot reach Node {}", source_node_id, destination_node_id),
                "network partition".to_string(),
            );
        }

        match state.nodes.get(&destination_node_id) {
            Some(handle) => Ok(handle.clone()),
            None => new_err(
                ErrorKind::Communication,
                format!("Node {} is not registered", destination_node_id),
                String::new(),
            ),
        }
    }
}

/// In-memory implementation of the PeerRequestHandler trait: requests are delivered straight to
/// the destination node's handle.
#[derive(Clone, Debug)]
pub struct InProcPeerCommunicator {
    source_node_id: NodeId,
    network: InProcNetwork,
}

impl PeerRequestHandler for InProcPeerCommunicator {
    fn send_vote_request(
        &self,
        destination_node_id: NodeId,
        request: VoteRequest,
    ) -> Result<VoteResponse, RaftError> {
        trace!(
            "Destination Node {} Sending request {}",
            destination_node_id,
            request
        );

        let resp = self
            .network
            .route(self.source_node_id, destination_node_id)?
            .handle_vote_request(request);

        trace!(
            "Destination Node {} Response {:?}",
            destination_node_id,
            resp
        );

        resp
    }

    fn send_freshness_request(
        &self,
        destination_node_id: NodeId,
    ) -> Result<FreshnessResponse, RaftError> {
        self.network
            .route(self.source_node_id, destination_node_id)?
            .freshness_response()
    }

    fn send_heartbeat(&self, destination_node_id: NodeId) -> Result<HeartbeatResponse, RaftError> {
        self.network
            .route(self.source_node_id, destination_node_id)?
            .heartbeat_response()
    }
}
