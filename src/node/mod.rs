use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::common::clock::Clock;
use crate::common::{NodeId, RaftWorker, RaftWorkerPool};
use crate::communication::peers::PeerRequestHandler;
use crate::configuration::cluster::Cluster;
use crate::configuration::node::NodeConfiguration;
use crate::errors::Result;
use crate::leadership::election_timer::ElectionTimer;
use crate::leadership::status::administrator::ElectionAdministrator;
use crate::node::coordinator::ElectionCoordinator;
use crate::node::handle::NodeHandle;
use crate::node::state::NodeStateStore;
use crate::operation_log::LogApplier;
use crate::workers::command_dispatcher::CommandDispatcher;
use crate::workers::election_worker::{run_election_worker, ElectionWorkerParams};
use crate::workers::heartbeat_poller::{run_heartbeat_poller, HeartbeatPollerParams};
use crate::common;

pub mod coordinator;
pub mod handle;
pub mod state;

#[derive(Debug)]
pub struct NodeStartingParams<Ns, Pc, Et, Cl, La, Ck>
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    pub node_id: NodeId,
    pub election: ElectionWorkerParams<Ns, Pc, Et, Cl, La, Ck>,
    pub heartbeats: HeartbeatPollerParams<Pc, Cl>,
}

/// Loads the durable election state and starts the node workers. The returned worker stops
/// everything on termination; the handle talks to the running node.
pub fn start_node<Ns, Pc, Et, Cl, La, Ck>(
    node_config: NodeConfiguration<Ns, Pc, Et, Cl, La, Ck>,
) -> Result<(RaftWorker, NodeHandle)>
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    let node_id = node_config.node_id;
    let administrator = ElectionAdministrator::new();

    let coordinator = ElectionCoordinator::new(
        node_id,
        node_config.cluster.configuration(),
        Arc::new(node_config.state_store),
        node_config.election_timer,
        node_config.clock,
        node_config.last_applied,
        node_config.last_durable,
    )?;
    let status = Arc::new(RwLock::new(coordinator.status()));

    let handle = NodeHandle::new(
        node_id,
        administrator.election_event_tx(),
        status.clone(),
        node_config.limits.handle_request_timeout,
    );

    let params = NodeStartingParams {
        node_id,
        election: ElectionWorkerParams {
            coordinator,
            dispatcher: CommandDispatcher {
                node_id,
                peer_communicator: node_config.peer_communicator.clone(),
                cluster: node_config.cluster.clone(),
                log_applier: node_config.log_applier,
                election_event_tx: administrator.election_event_tx(),
            },
            election_event_rx: administrator.election_event_rx().clone(),
            status,
            idle_poll_interval: node_config.limits.idle_poll_interval,
        },
        heartbeats: HeartbeatPollerParams {
            node_id,
            peer_communicator: node_config.peer_communicator,
            cluster: node_config.cluster,
            election_event_tx: administrator.election_event_tx(),
        },
    };

    let worker = common::run_worker(start, params);

    Ok((worker, handle))
}

fn start<Ns, Pc, Et, Cl, La, Ck>(
    params: NodeStartingParams<Ns, Pc, Et, Cl, La, Ck>,
    terminate_worker_rx: Receiver<()>,
) where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    let node_id = params.node_id;

    let election_worker = common::run_worker(run_election_worker, params.election);
    let heartbeat_worker = common::run_worker(run_heartbeat_poller, params.heartbeats);

    let worker_pool = RaftWorkerPool::new(vec![heartbeat_worker, election_worker]);

    info!("Node {} started", node_id);

    let terminate_result = terminate_worker_rx.recv();
    if let Err(e) = terminate_result {
        error!("Abnormal exit for node: {}", e);
    }

    info!("Node {} termination requested", node_id);

    worker_pool.terminate();
    worker_pool.join();

    info!("Node {} shutting down", node_id);
}
