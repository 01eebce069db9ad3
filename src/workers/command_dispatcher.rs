use crossbeam_channel::Sender;

use crate::common;
use crate::common::cancellation::CancellationToken;
use crate::common::peer_consensus_requester::request_peer_responses;
use crate::common::{NodeId, Term};
use crate::communication::peers::{FreshnessResponse, PeerRequestHandler, VoteRequest, VoteResponse};
use crate::configuration::cluster::Cluster;
use crate::errors::RaftError;
use crate::leadership::status::ElectionEvent;
use crate::node::coordinator::CoordinatorCommand;
use crate::operation_log::LogApplier;

/// Executes coordinator commands. Fan-outs run on their own threads and post every answer
/// back to the election worker, tagged with the attempt id or term they belong to.
#[derive(Debug)]
pub struct CommandDispatcher<Pc, Cl, La>
where
    Pc: PeerRequestHandler,
    Cl: Cluster,
    La: LogApplier,
{
    pub node_id: NodeId,
    pub peer_communicator: Pc,
    pub cluster: Cl,
    pub log_applier: La,
    pub election_event_tx: Sender<ElectionEvent>,
}

struct VoteFanOut<Pc: PeerRequestHandler> {
    attempt_id: u64,
    peers: Vec<NodeId>,
    request: VoteRequest,
    cancellation: CancellationToken,
    peer_communicator: Pc,
    election_event_tx: Sender<ElectionEvent>,
}

struct FreshnessScan<Pc: PeerRequestHandler> {
    term: Term,
    peers: Vec<NodeId>,
    cancellation: CancellationToken,
    peer_communicator: Pc,
    election_event_tx: Sender<ElectionEvent>,
}

impl<Pc, Cl, La> CommandDispatcher<Pc, Cl, La>
where
    Pc: PeerRequestHandler,
    Cl: Cluster,
    La: LogApplier,
{
    pub fn dispatch(&self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::RequestVotes {
                attempt_id,
                peers,
                request,
                cancellation,
            } => {
                trace!("Node {} sending {} to {:?}", self.node_id, request, peers);
                common::run_worker_thread(
                    request_votes,
                    VoteFanOut {
                        attempt_id,
                        peers,
                        request,
                        cancellation,
                        peer_communicator: self.peer_communicator.clone(),
                        election_event_tx: self.election_event_tx.clone(),
                    },
                );
            }
            CoordinatorCommand::ScanFreshness {
                term,
                peers,
                cancellation,
            } => {
                trace!("Node {} scanning freshness of {:?}", self.node_id, peers);
                common::run_worker_thread(
                    scan_freshness,
                    FreshnessScan {
                        term,
                        peers,
                        cancellation,
                        peer_communicator: self.peer_communicator.clone(),
                        election_event_tx: self.election_event_tx.clone(),
                    },
                );
            }
            CoordinatorCommand::DrainModeEntered { term } => {
                self.log_applier.drain_mode_entered(term);
            }
            CoordinatorCommand::ConfigurationMismatch { peer_id, version } => {
                self.cluster.report_newer_configuration(peer_id, version);
            }
        }
    }
}

fn request_votes<Pc: PeerRequestHandler>(params: VoteFanOut<Pc>) {
    let communicator = params.peer_communicator;
    let event_tx = params.election_event_tx;
    let attempt_id = params.attempt_id;

    let requester = |dest_node_id: NodeId, req: VoteRequest| {
        communicator.send_vote_request(dest_node_id, req)
    };
    let on_response = |peer_id: NodeId, result: Result<VoteResponse, RaftError>| {
        let event = ElectionEvent::VoteResponseReceived {
            attempt_id,
            peer_id,
            result,
        };
        if event_tx.send(event).is_err() {
            debug!("Vote response from Node {} dropped: election worker stopped", peer_id);
        }
    };

    request_peer_responses(
        params.request,
        params.peers,
        &params.cancellation,
        requester,
        on_response,
    );
}

fn scan_freshness<Pc: PeerRequestHandler>(params: FreshnessScan<Pc>) {
    let communicator = params.peer_communicator;
    let event_tx = params.election_event_tx;
    let term = params.term;

    let requester = |dest_node_id: NodeId, _: ()| communicator.send_freshness_request(dest_node_id);
    let on_response = |peer_id: NodeId, result: Result<FreshnessResponse, RaftError>| {
        let event = ElectionEvent::FreshnessResponseReceived {
            term,
            peer_id,
            result,
        };
        if event_tx.send(event).is_err() {
            debug!("Freshness response from Node {} dropped: election worker stopped", peer_id);
        }
    };

    request_peer_responses((), params.peers, &params.cancellation, requester, on_response);
}
