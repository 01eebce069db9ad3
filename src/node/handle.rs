use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::{NodeId, Term};
use crate::communication::peers::{FreshnessResponse, HeartbeatResponse, VoteRequest, VoteResponse};
use crate::configuration::cluster::ClusterConfiguration;
use crate::errors::{new_err, ErrorKind, Result};
use crate::leadership::status::{ApplierState, ElectionEvent, Role};
use crate::leadership::term::TermUpdate;
use crate::node::coordinator::NodeStatus;
use crate::operation_log::Position;

/// Cloneable entry point into a running node. Queries read the last published status;
/// commands go through the election event channel and wait for the worker's answer.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    node_id: NodeId,
    election_event_tx: Sender<ElectionEvent>,
    status: Arc<RwLock<NodeStatus>>,
    request_timeout: Duration,
}

impl NodeHandle {
    pub(crate) fn new(
        node_id: NodeId,
        election_event_tx: Sender<ElectionEvent>,
        status: Arc<RwLock<NodeStatus>>,
        request_timeout: Duration,
    ) -> NodeHandle {
        NodeHandle {
            node_id,
            election_event_tx,
            status,
            request_timeout,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn status(&self) -> NodeStatus {
        *self.status.read()
    }

    pub fn current_role(&self) -> Role {
        self.status.read().role
    }

    pub fn current_term(&self) -> Term {
        self.status.read().term
    }

    pub fn current_applier_state(&self) -> ApplierState {
        self.status.read().applier_state
    }

    pub fn can_accept_writes(&self) -> bool {
        self.status.read().can_accept_writes
    }

    pub fn election_timeout_deadline(&self) -> Option<Instant> {
        self.status.read().election_timeout_deadline
    }

    pub fn priority_takeover_deadline(&self) -> Option<Instant> {
        self.status.read().priority_takeover_deadline
    }

    pub fn handle_vote_request(&self, request: VoteRequest) -> Result<VoteResponse> {
        self.request(|reply_tx| ElectionEvent::VoteRequested { request, reply_tx })
    }

    pub fn heartbeat_response(&self) -> Result<HeartbeatResponse> {
        self.request(|reply_tx| ElectionEvent::HeartbeatRequested { reply_tx })
    }

    pub fn freshness_response(&self) -> Result<FreshnessResponse> {
        self.request(|reply_tx| ElectionEvent::FreshnessRequested { reply_tx })
    }

    pub fn update_term(&self, term: Term) -> Result<TermUpdate> {
        self.request(|reply_tx| ElectionEvent::UpdateTerm { term, reply_tx })?
    }

    pub fn request_step_down(&self) -> Result<()> {
        self.request(|reply_tx| ElectionEvent::StepDownRequested { reply_tx })?
    }

    pub fn begin_reconfiguration(&self) -> Result<()> {
        self.request(|reply_tx| ElectionEvent::ReconfigurationStarted { reply_tx })?
    }

    pub fn install_configuration(&self, config: ClusterConfiguration) -> Result<()> {
        self.notify(ElectionEvent::ConfigurationInstalled(config))
    }

    /// Begins and installs a configuration in one step.
    pub fn reconfigure(&self, config: ClusterConfiguration) -> Result<()> {
        self.begin_reconfiguration()?;
        self.install_configuration(config)
    }

    pub fn enter_rollback(&self) -> Result<()> {
        self.request(|reply_tx| ElectionEvent::RollbackStarted { reply_tx })?
    }

    pub fn leave_rollback(&self) -> Result<()> {
        self.request(|reply_tx| ElectionEvent::RollbackFinished { reply_tx })?
    }

    pub fn signal_drain_complete(&self, term: Term) -> Result<()> {
        self.notify(ElectionEvent::DrainComplete(term))
    }

    pub fn set_last_applied(&self, position: Position) -> Result<()> {
        self.notify(ElectionEvent::AppliedAdvanced(position))
    }

    pub fn set_last_durable(&self, position: Position) -> Result<()> {
        self.notify(ElectionEvent::DurableAdvanced(position))
    }

    fn notify(&self, event: ElectionEvent) -> Result<()> {
        if self.election_event_tx.send(event).is_err() {
            return new_err(
                ErrorKind::Communication,
                format!("Node {} is not running", self.node_id),
                String::new(),
            );
        }

        Ok(())
    }

    fn request<T, F>(&self, make_event: F) -> Result<T>
    where
        F: FnOnce(Sender<T>) -> ElectionEvent,
    {
        let (reply_tx, reply_rx): (Sender<T>, Receiver<T>) = crossbeam_channel::bounded(1);
        self.notify(make_event(reply_tx))?;

        match reply_rx.recv_timeout(self.request_timeout) {
            Ok(value) => Ok(value),
            Err(err) => new_err(
                ErrorKind::Timeout,
                format!("Node {} did not answer in time", self.node_id),
                err.to_string(),
            ),
        }
    }
}
