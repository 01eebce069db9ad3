use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::common::clock::Clock;
use crate::communication::peers::PeerRequestHandler;
use crate::configuration::cluster::Cluster;
use crate::leadership::election_timer::ElectionTimer;
use crate::leadership::status::ElectionEvent;
use crate::node::coordinator::{ElectionCoordinator, NodeStatus};
use crate::node::state::NodeStateStore;
use crate::operation_log::LogApplier;
use crate::workers::command_dispatcher::CommandDispatcher;

#[derive(Debug)]
pub struct ElectionWorkerParams<Ns, Pc, Et, Cl, La, Ck>
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    pub coordinator: ElectionCoordinator<Ns, Et, Ck>,
    pub dispatcher: CommandDispatcher<Pc, Cl, La>,
    pub election_event_rx: Receiver<ElectionEvent>,
    pub status: Arc<RwLock<NodeStatus>>,
    pub idle_poll_interval: Duration,
}

/// Applies election events one by one, fires due deadlines, hands the resulting commands to the
/// dispatcher and publishes the status snapshot.
pub fn run_election_worker<Ns, Pc, Et, Cl, La, Ck>(
    params: ElectionWorkerParams<Ns, Pc, Et, Cl, La, Ck>,
    terminate_worker_rx: Receiver<()>,
) where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    let mut params = params;
    let node_id = params.coordinator.node_id();
    let election_event_rx = params.election_event_rx.clone();

    info!("Node {} election worker started", node_id);
    params.coordinator.start();
    flush(&mut params);

    loop {
        let tick = crossbeam_channel::after(next_wakeup(&params));
        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for election worker");
                }
                break
            },
            recv(election_event_rx) -> event => {
                match event {
                    Ok(event) => apply_event(&mut params.coordinator, event),
                    Err(_) => {
                        error!("Node {} election event channel closed", node_id);
                        break
                    }
                }
            },
            recv(tick) -> _ => {},
        );

        params.coordinator.on_tick();
        flush(&mut params);
    }
    info!("Node {} election worker stopped", node_id);
}

fn next_wakeup<Ns, Pc, Et, Cl, La, Ck>(params: &ElectionWorkerParams<Ns, Pc, Et, Cl, La, Ck>) -> Duration
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    let now = params.coordinator.now();
    match params.coordinator.next_deadline() {
        Some(deadline) => deadline
            .saturating_duration_since(now)
            .min(params.idle_poll_interval),
        None => params.idle_poll_interval,
    }
}

fn flush<Ns, Pc, Et, Cl, La, Ck>(params: &mut ElectionWorkerParams<Ns, Pc, Et, Cl, La, Ck>)
where
    Ns: NodeStateStore,
    Pc: PeerRequestHandler,
    Et: ElectionTimer,
    Cl: Cluster,
    La: LogApplier,
    Ck: Clock,
{
    for command in params.coordinator.take_commands() {
        params.dispatcher.dispatch(command);
    }

    *params.status.write() = params.coordinator.status();
}

fn apply_event<Ns, Et, Ck>(coordinator: &mut ElectionCoordinator<Ns, Et, Ck>, event: ElectionEvent)
where
    Ns: NodeStateStore,
    Et: ElectionTimer,
    Ck: Clock,
{
    match event {
        ElectionEvent::VoteResponseReceived {
            attempt_id,
            peer_id,
            result,
        } => coordinator.on_vote_response(attempt_id, peer_id, result),
        ElectionEvent::FreshnessResponseReceived {
            term,
            peer_id,
            result,
        } => coordinator.on_freshness_response(term, peer_id, result),
        ElectionEvent::HeartbeatReceived(response) => coordinator.on_heartbeat(response),
        ElectionEvent::HeartbeatFailed(peer_id) => coordinator.on_heartbeat_failure(peer_id),
        ElectionEvent::VoteRequested { request, reply_tx } => {
            reply(reply_tx, coordinator.handle_vote_request(request))
        }
        ElectionEvent::HeartbeatRequested { reply_tx } => {
            reply(reply_tx, coordinator.heartbeat_response())
        }
        ElectionEvent::FreshnessRequested { reply_tx } => {
            reply(reply_tx, coordinator.freshness_response())
        }
        ElectionEvent::UpdateTerm { term, reply_tx } => reply(reply_tx, coordinator.update_term(term)),
        ElectionEvent::StepDownRequested { reply_tx } => {
            reply(reply_tx, coordinator.request_step_down())
        }
        ElectionEvent::DrainComplete(term) => {
            coordinator.signal_drain_complete(term);
        }
        ElectionEvent::AppliedAdvanced(position) => coordinator.set_last_applied(position),
        ElectionEvent::DurableAdvanced(position) => coordinator.set_last_durable(position),
        ElectionEvent::ReconfigurationStarted { reply_tx } => {
            reply(reply_tx, coordinator.begin_reconfiguration())
        }
        ElectionEvent::ConfigurationInstalled(config) => coordinator.install_configuration(config),
        ElectionEvent::RollbackStarted { reply_tx } => reply(reply_tx, coordinator.enter_rollback()),
        ElectionEvent::RollbackFinished { reply_tx } => reply(reply_tx, coordinator.leave_rollback()),
    }
}

fn reply<T>(reply_tx: Sender<T>, value: T) {
    if reply_tx.send(value).is_err() {
        debug!("Reply dropped: the requester is gone");
    }
}
