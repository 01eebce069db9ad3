use crossbeam_channel::{Receiver, Sender};

use crate::common::cancellation::CancellationToken;
use crate::common::peer_consensus_requester::request_peer_responses;
use crate::common::NodeId;
use crate::communication::peers::{HeartbeatResponse, PeerRequestHandler};
use crate::configuration::cluster::Cluster;
use crate::errors::RaftError;
use crate::leadership::status::ElectionEvent;

#[derive(Debug)]
pub struct HeartbeatPollerParams<Pc, Cl>
where
    Pc: PeerRequestHandler,
    Cl: Cluster,
{
    pub node_id: NodeId,
    pub peer_communicator: Pc,
    pub cluster: Cl,
    pub election_event_tx: Sender<ElectionEvent>,
}

/// Polls every peer once per heartbeat interval and forwards replies and failures to the
/// election worker.
pub fn run_heartbeat_poller<Pc, Cl>(
    params: HeartbeatPollerParams<Pc, Cl>,
    terminate_worker_rx: Receiver<()>,
) where
    Pc: PeerRequestHandler,
    Cl: Cluster,
{
    info!("Node {} heartbeat poller started", params.node_id);
    loop {
        let heartbeat_interval = params.cluster.configuration().settings.heartbeat_interval;
        let heartbeat_timeout = crossbeam_channel::after(heartbeat_interval);
        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for heartbeat poller");
                }
                break
            },
            recv(heartbeat_timeout) -> _  => {
                poll_peers(&params);
            },
        );
    }
    info!("Node {} heartbeat poller stopped", params.node_id);
}

fn poll_peers<Pc, Cl>(params: &HeartbeatPollerParams<Pc, Cl>)
where
    Pc: PeerRequestHandler,
    Cl: Cluster,
{
    let peers = params.cluster.configuration().peers(params.node_id);
    trace!("Node {} sending heartbeats to {:?}", params.node_id, peers);

    let requester = |dest_node_id: NodeId, _: ()| params.peer_communicator.send_heartbeat(dest_node_id);
    let on_response = |peer_id: NodeId, result: Result<HeartbeatResponse, RaftError>| {
        let event = match result {
            Ok(response) => ElectionEvent::HeartbeatReceived(response),
            Err(err) => {
                trace!("Node {} heartbeat to Node {} failed: {}", params.node_id, peer_id, err);
                ElectionEvent::HeartbeatFailed(peer_id)
            }
        };
        if params.election_event_tx.send(event).is_err() {
            debug!("Heartbeat result from Node {} dropped: election worker stopped", peer_id);
        }
    };

    request_peer_responses((), peers, &CancellationToken::new(), requester, on_response);
}
