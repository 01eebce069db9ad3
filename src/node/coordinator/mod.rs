use std::sync::Arc;
use std::time::Instant;

use crate::catch_up::{CatchUpController, CatchUpOutcome};
use crate::common::cancellation::CancellationToken;
use crate::common::clock::Clock;
use crate::common::{NodeId, Term};
use crate::communication::peers::{
    FreshnessResponse, HeartbeatResponse, ReportedRole, VoteRequest, VoteResponse,
};
use crate::configuration::cluster::ClusterConfiguration;
use crate::errors::{new_err, new_multiple_err, ErrorKind, RaftError, Result};
use crate::leadership::election_timer::{ElectionTimeoutScheduler, ElectionTimer};
use crate::leadership::heartbeat::HeartbeatTracker;
use crate::leadership::priority_takeover::{
    check_takeover, takeover_wanted, PriorityTakeoverScheduler, TakeoverVerdict,
};
use crate::leadership::status::node_leadership_fsm::RoleStateMachine;
use crate::leadership::status::{ApplierState, ElectionReason, LeaderPhase, Role};
use crate::leadership::term::{TermManager, TermUpdate};
use crate::leadership::vote_ledger::VoteLedger;
use crate::leadership::vote_request_processor::{process_vote_request, VoterState};
use crate::leadership::vote_requester::{
    AttemptOutcome, ElectionAttempt, TallyState, VoteRequester,
};
use crate::node::state::{LastVote, NodeStateStore};
use crate::operation_log::Position;


/// Side effects requested by the coordinator. The runtime executes them and reports results
/// back as events.
#[derive(Clone, Debug)]
pub enum CoordinatorCommand {
    RequestVotes {
        attempt_id: u64,
        peers: Vec<NodeId>,
        request: VoteRequest,
        cancellation: CancellationToken,
    },
    ScanFreshness {
        term: Term,
        peers: Vec<NodeId>,
        cancellation: CancellationToken,
    },
    DrainModeEntered {
        term: Term,
    },
    ConfigurationMismatch {
        peer_id: NodeId,
        version: u64,
    },
}

/// Read-only snapshot of the election state, published after every applied event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStatus {
    pub node_id: NodeId,
    pub role: Role,
    pub term: Term,
    pub leader_id: Option<NodeId>,
    pub applier_state: ApplierState,
    pub can_accept_writes: bool,
    pub last_applied: Position,
    pub last_durable: Position,
    pub config_version: u64,
    pub election_timeout_deadline: Option<Instant>,
    pub priority_takeover_deadline: Option<Instant>,
    pub catch_up_deadline: Option<Instant>,
}

impl NodeStatus {
    pub fn new(node_id: NodeId) -> NodeStatus {
        NodeStatus {
            node_id,
            role: Role::Follower,
            term: 0,
            leader_id: None,
            applier_state: ApplierState::Running,
            can_accept_writes: false,
            last_applied: Position::default(),
            last_durable: Position::default(),
            config_version: 0,
            election_timeout_deadline: None,
            priority_takeover_deadline: None,
            catch_up_deadline: None,
        }
    }
}

/// The single point where election state changes. Not thread-safe on purpose: the election
/// worker owns it and applies events one at a time. Nothing here blocks on the network; fan-outs
/// are handed out as `CoordinatorCommand`s.
#[derive(Debug)]
pub struct ElectionCoordinator<Ns, Et, Ck>
where
    Ns: NodeStateStore,
    Et: ElectionTimer,
    Ck: Clock,
{
    node_id: NodeId,
    config: ClusterConfiguration,
    terms: TermManager<Ns>,
    ledger: VoteLedger<Ns>,
    roles: RoleStateMachine,
    heartbeats: HeartbeatTracker,
    election_timeout: ElectionTimeoutScheduler<Et>,
    takeover: PriorityTakeoverScheduler,
    vote_requester: Option<VoteRequester>,
    catch_up: Option<CatchUpController>,
    last_attempt_id: u64,
    last_applied: Position,
    last_durable: Position,
    reconfiguring: bool,
    leader_id: Option<NodeId>,
    clock: Ck,
    commands: Vec<CoordinatorCommand>,
}

impl<Ns, Et, Ck> ElectionCoordinator<Ns, Et, Ck>
where
    Ns: NodeStateStore,
    Et: ElectionTimer,
    Ck: Clock,
{
    pub fn new(
        node_id: NodeId,
        config: ClusterConfiguration,
        store: Arc<Ns>,
        election_timer: Et,
        clock: Ck,
        last_applied: Position,
        last_durable: Position,
    ) -> Result<ElectionCoordinator<Ns, Et, Ck>> {
        let terms = TermManager::load(store.clone())?;
        let ledger = VoteLedger::load(store)?;
        let heartbeats = HeartbeatTracker::new(&config.peers(node_id));

        Ok(ElectionCoordinator {
            node_id,
            config,
            terms,
            ledger,
            roles: RoleStateMachine::new(node_id),
            heartbeats,
            election_timeout: ElectionTimeoutScheduler::new(election_timer),
            takeover: PriorityTakeoverScheduler::new(),
            vote_requester: None,
            catch_up: None,
            last_attempt_id: 0,
            last_applied,
            last_durable,
            reconfiguring: false,
            leader_id: None,
            clock,
            commands: Vec::new(),
        })
    }

    /// Arms the election timer, or stands for election right away when this node is the only
    /// voter.
    pub fn start(&mut self) {
        info!(
            "Node {} election coordinator started in term {}",
            self.node_id,
            self.terms.current_term()
        );

        if self.config.voter_count() == 1 && self.config.is_electable(self.node_id) {
            self.start_dry_run(ElectionReason::SingleNode);
        } else {
            self.arm_election_timer();
        }
    }

    pub fn take_commands(&mut self) -> Vec<CoordinatorCommand> {
        std::mem::replace(&mut self.commands, Vec::new())
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn current_role(&self) -> Role {
        self.roles.role()
    }

    pub fn current_term(&self) -> Term {
        self.terms.current_term()
    }

    pub fn current_applier_state(&self) -> ApplierState {
        self.roles.role().applier_state()
    }

    pub fn can_accept_writes(&self) -> bool {
        self.roles.can_accept_writes()
    }

    pub fn election_timeout_deadline(&self) -> Option<Instant> {
        self.election_timeout.deadline()
    }

    pub fn priority_takeover_deadline(&self) -> Option<Instant> {
        self.takeover.deadline()
    }

    pub fn catch_up_deadline(&self) -> Option<Instant> {
        self.catch_up.as_ref().map(|c| c.deadline())
    }

    pub fn leader_id(&self) -> Option<NodeId> {
        self.leader_id
    }

    pub fn last_vote(&self) -> Option<LastVote> {
        self.ledger.last_vote()
    }

    pub fn configuration(&self) -> &ClusterConfiguration {
        &self.config
    }

    pub fn is_reconfiguring(&self) -> bool {
        self.reconfiguring
    }

    /// Id of the attempt whose votes are being gathered.
    pub fn active_attempt(&self) -> Option<&ElectionAttempt> {
        self.vote_requester.as_ref().map(|r| r.attempt())
    }

    /// Earliest pending deadline, used by the runtime to sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        vec![
            self.election_timeout.deadline(),
            self.takeover.deadline(),
            self.catch_up_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn status(&self) -> NodeStatus {
        let role = self.roles.role();

        NodeStatus {
            node_id: self.node_id,
            role,
            term: self.terms.current_term(),
            leader_id: self.leader_id,
            applier_state: role.applier_state(),
            can_accept_writes: self.roles.can_accept_writes(),
            last_applied: self.last_applied,
            last_durable: self.last_durable,
            config_version: self.config.version,
            election_timeout_deadline: self.election_timeout.deadline(),
            priority_takeover_deadline: self.takeover.deadline(),
            catch_up_deadline: self.catch_up_deadline(),
        }
    }

    /// Fires every deadline that has passed.
    pub fn on_tick(&mut self) {
        let now = self.clock.now();

        if self.election_timeout.is_expired(now) {
            self.election_timeout.cancel();
            self.on_election_timeout();
        }

        if self.takeover.is_due(now) {
            self.takeover.cancel();
            self.on_priority_takeover();
        }

        self.poll_catch_up();
    }

    pub fn on_vote_response(
        &mut self,
        attempt_id: u64,
        peer_id: NodeId,
        result: std::result::Result<VoteResponse, RaftError>,
    ) {
        let state = match self.vote_requester.as_mut() {
            Some(requester) if requester.attempt().id == attempt_id => match result {
                Ok(response) => {
                    trace!("Node {} received {}", self.node_id, response);
                    requester.on_response(response)
                }
                Err(err) => {
                    debug!("Node {} vote request to Node {} failed: {}", self.node_id, peer_id, err);
                    requester.on_failure(peer_id, err)
                }
            },
            _ => {
                trace!(
                    "Node {} discarded a vote response of finished attempt {} from Node {}",
                    self.node_id,
                    attempt_id,
                    peer_id
                );
                return;
            }
        };

        if let TallyState::Finished(_) = state {
            self.finish_attempt();
        }
    }

    pub fn on_freshness_response(
        &mut self,
        term: Term,
        peer_id: NodeId,
        result: std::result::Result<FreshnessResponse, RaftError>,
    ) {
        match self.catch_up.as_mut() {
            Some(controller) if controller.term() == term => match result {
                Ok(response) => controller.on_freshness_response(peer_id, response.applied),
                Err(err) => controller.on_freshness_failure(peer_id, err),
            },
            _ => {
                trace!(
                    "Node {} discarded a freshness response for term {} from Node {}",
                    self.node_id,
                    term,
                    peer_id
                );
                return;
            }
        }

        self.poll_catch_up();
    }

    pub fn on_heartbeat(&mut self, response: HeartbeatResponse) {
        let now = self.clock.now();
        if self.heartbeats.on_response(&response, now).is_none() {
            trace!(
                "Node {} ignored a heartbeat from Node {} outside the configuration",
                self.node_id,
                response.peer_id
            );
            return;
        }

        if response.config_version > self.config.version {
            info!(
                "Node {} sees newer config version {} on Node {}, mine is {}",
                self.node_id, response.config_version, response.peer_id, self.config.version
            );
            self.commands.push(CoordinatorCommand::ConfigurationMismatch {
                peer_id: response.peer_id,
                version: response.config_version,
            });
            self.reconfiguring = true;
            self.cancel_election("newer configuration reported by heartbeat");
            self.takeover.cancel();
        } else if response.config_version < self.config.version {
            debug!(
                "Node {} ignores older config version {} on Node {}",
                self.node_id, response.config_version, response.peer_id
            );
        }

        if response.term > self.terms.current_term() {
            self.discover_term(response.term);
        }

        if response.role == ReportedRole::Primary
            && response.term >= self.terms.current_term()
            && self.roles.is_follower()
        {
            if self.leader_id != Some(response.peer_id) {
                info!(
                    "Node {} follows Node {} as primary of term {}",
                    self.node_id, response.peer_id, response.term
                );
            }
            self.leader_id = Some(response.peer_id);
            self.arm_election_timer();
        }

        self.evaluate_priority_takeover();
    }

    pub fn on_heartbeat_failure(&mut self, peer_id: NodeId) {
        self.heartbeats.on_failure(peer_id);
        if self.leader_id == Some(peer_id) {
            self.leader_id = None;
        }

        self.evaluate_priority_takeover();
    }

    /// Voter side of an election.
    pub fn handle_vote_request(&mut self, request: VoteRequest) -> VoteResponse {
        if !request.dry_run && request.term > self.terms.current_term() {
            self.discover_term(request.term);
        }

        let voter = VoterState {
            node_id: self.node_id,
            current_term: self.terms.current_term(),
            config_version: self.config.version,
            last_applied: self.last_applied,
        };
        let response = process_vote_request(&request, &voter, &self.ledger);

        info!(
            "Node {} {} vote for Node {} in term {} (dry_run={}){}",
            self.node_id,
            if response.vote_granted { "granted" } else { "refused" },
            request.candidate_id,
            request.term,
            request.dry_run,
            if response.reason.is_empty() {
                String::new()
            } else {
                format!(": {}", response.reason)
            }
        );

        if response.vote_granted && !request.dry_run {
            self.arm_election_timer();
        }

        response
    }

    pub fn heartbeat_response(&self) -> HeartbeatResponse {
        HeartbeatResponse {
            peer_id: self.node_id,
            role: self.roles.role().reported_role(),
            term: self.terms.current_term(),
            applied: self.last_applied,
            durable: self.last_durable,
            config_version: self.config.version,
        }
    }

    pub fn freshness_response(&self) -> FreshnessResponse {
        FreshnessResponse {
            peer_id: self.node_id,
            applied: self.last_applied,
        }
    }

    pub fn set_last_applied(&mut self, position: Position) {
        self.last_applied = position;
        self.poll_catch_up();
    }

    pub fn set_last_durable(&mut self, position: Position) {
        self.last_durable = position;
    }

    /// Adopts a newer term learned from outside.
    pub fn update_term(&mut self, term: Term) -> Result<TermUpdate> {
        let update = self.terms.try_advance_term(term)?;
        if update.accepted {
            self.on_term_advanced(update.current_term);
        }

        Ok(update)
    }

    pub fn request_step_down(&mut self) -> Result<()> {
        match self.roles.role() {
            Role::Follower | Role::Rollback => {
                return new_err(
                    ErrorKind::InvalidRole,
                    format!("Node {} cannot step down", self.node_id),
                    format!("current role is {}", self.roles.role()),
                );
            }
            Role::Candidate { .. } | Role::Leader(_) => {}
        }

        info!("Node {} stepping down on request", self.node_id);
        self.cancel_election("step-down requested");
        self.stop_transition_to_primary();
        self.roles.step_down();
        self.leader_id = None;
        self.arm_election_timer();

        Ok(())
    }

    /// Completes the leader's drain. Stale signals for another term or phase are ignored.
    pub fn signal_drain_complete(&mut self, term: Term) -> bool {
        let current_term = self.terms.current_term();
        if term != current_term || self.roles.role() != Role::Leader(LeaderPhase::Draining) {
            debug!(
                "Node {} ignored a drain completion for term {} (term {}, role {})",
                self.node_id,
                term,
                current_term,
                self.roles.role()
            );
            return false;
        }

        match self.roles.activate() {
            Ok(()) => {
                info!(
                    "Node {} transition to primary complete; writes are now permitted in term {}",
                    self.node_id, term
                );
                true
            }
            Err(err) => {
                warn!("Node {} {}", self.node_id, err);
                false
            }
        }
    }

    pub fn begin_reconfiguration(&mut self) -> Result<()> {
        if self.reconfiguring {
            return new_err(
                ErrorKind::ConfigurationInProgress,
                format!("Node {} cannot start a reconfiguration", self.node_id),
                "another reconfiguration is in progress".to_string(),
            );
        }

        self.reconfiguring = true;
        self.cancel_election("reconfiguration started");
        self.takeover.cancel();

        Ok(())
    }

    pub fn install_configuration(&mut self, config: ClusterConfiguration) {
        info!(
            "Node {} installing config version {} ({} members)",
            self.node_id,
            config.version,
            config.members.len()
        );

        self.heartbeats.set_members(&config.peers(self.node_id));
        self.config = config;
        self.reconfiguring = false;

        if !self.config.is_electable(self.node_id) {
            self.election_timeout.cancel();
        } else if self.election_timeout.deadline().is_none() {
            self.arm_election_timer();
        }
        self.evaluate_priority_takeover();
    }

    pub fn enter_rollback(&mut self) -> Result<()> {
        self.roles.enter_rollback()?;

        if let Some(mut requester) = self.vote_requester.take() {
            requester.cancel();
            info!(
                "Node {} election attempt {} aborted by rollback",
                self.node_id,
                requester.attempt().id
            );
        }
        self.election_timeout.cancel();
        self.takeover.cancel();

        Ok(())
    }

    pub fn leave_rollback(&mut self) -> Result<()> {
        self.roles.leave_rollback()?;
        self.arm_election_timer();

        Ok(())
    }

    fn on_election_timeout(&mut self) {
        if !self.roles.is_follower() {
            return;
        }

        if self.reconfiguring {
            info!(
                "Node {} Not standing for election; processing a configuration change",
                self.node_id
            );
            self.arm_election_timer();
            return;
        }

        self.leader_id = None;
        self.start_dry_run(ElectionReason::ElectionTimeout);
    }

    fn on_priority_takeover(&mut self) {
        let verdict = check_takeover(
            self.roles.is_follower(),
            self.reconfiguring,
            self.last_applied,
            self.heartbeats.most_advanced_applied(),
            &self.config.settings.freshness_window,
        );

        match verdict {
            TakeoverVerdict::NotFollower => {}
            TakeoverVerdict::Reconfiguring => info!(
                "Node {} Not standing for election; processing a configuration change",
                self.node_id
            ),
            TakeoverVerdict::NotFreshEnough => info!(
                "Node {} Not standing for election because member is not caught up enough to \
                 the most up-to-date member to call for priority takeover",
                self.node_id
            ),
            TakeoverVerdict::StandForElection => {
                self.start_dry_run(ElectionReason::PriorityTakeover)
            }
        }
    }

    fn evaluate_priority_takeover(&mut self) {
        let wanted = self.roles.is_follower()
            && !self.reconfiguring
            && takeover_wanted(&self.config, self.node_id, self.heartbeats.current_primary());

        if wanted && !self.takeover.is_pending() {
            let settings = self.config.settings;
            let delay = self.config.priority_takeover_delay(self.node_id)
                + self.election_timeout.offset(
                    settings.election_timeout,
                    settings.election_timeout_offset_fraction,
                );
            let deadline = self.clock.now() + delay;
            self.takeover.schedule(deadline);

            info!(
                "Node {} scheduled a priority takeover in {:?}",
                self.node_id, delay
            );
        } else if !wanted && self.takeover.cancel() {
            info!("Node {} cancelled the pending priority takeover", self.node_id);
        }
    }

    fn start_dry_run(&mut self, reason: ElectionReason) {
        if let Err(err) = self.roles.become_candidate(true) {
            warn!("Node {} {}", self.node_id, err);
            return;
        }

        self.election_timeout.cancel();
        self.takeover.cancel();

        let term = self.terms.current_term();
        info!(
            "Node {} conducting a dry run election for {} in term {}",
            self.node_id, reason, term
        );
        self.start_attempt(term, true, reason);
    }

    fn start_real_election(&mut self, reason: ElectionReason) {
        let new_term = self.terms.current_term() + 1;

        let started = self
            .persist_self_vote(new_term)
            .and_then(|_| self.roles.become_candidate(false));
        if let Err(err) = started {
            error!(
                "Node {} cannot start an election for term {}: {}",
                self.node_id, new_term, err
            );
            self.fall_back_to_follower();
            return;
        }

        self.start_attempt(new_term, false, reason);
    }

    fn persist_self_vote(&mut self, new_term: Term) -> Result<()> {
        let update = self.terms.try_advance_term(new_term)?;
        if !update.accepted {
            return new_err(
                ErrorKind::StaleTerm,
                format!("term {} was not accepted", new_term),
                format!("current term is {}", update.current_term),
            );
        }

        self.ledger.record_vote(new_term, self.node_id)
    }

    fn start_attempt(&mut self, term: Term, dry_run: bool, reason: ElectionReason) {
        self.last_attempt_id += 1;
        let attempt = ElectionAttempt {
            id: self.last_attempt_id,
            term,
            dry_run,
            reason,
            started_at: self.clock.now(),
            cancellation: CancellationToken::new(),
        };
        let request = VoteRequest {
            term,
            candidate_id: self.node_id,
            config_version: self.config.version,
            last_applied: self.last_applied,
            dry_run,
        };

        let requester = VoteRequester::new(
            attempt.clone(),
            self.node_id,
            self.config.voter_count(),
            self.config.quorum_size(),
        );
        let finished = requester.state() != TallyState::Gathering;
        self.vote_requester = Some(requester);

        if finished {
            self.finish_attempt();
        } else {
            self.commands.push(CoordinatorCommand::RequestVotes {
                attempt_id: attempt.id,
                peers: self.config.voting_peers(self.node_id),
                request,
                cancellation: attempt.cancellation,
            });
        }
    }

    fn finish_attempt(&mut self) {
        let requester = match self.vote_requester.take() {
            Some(requester) => requester,
            None => return,
        };
        let attempt = requester.attempt().clone();
        let outcome = match requester.state() {
            TallyState::Finished(outcome) => outcome,
            TallyState::Gathering => {
                self.vote_requester = Some(requester);
                return;
            }
        };

        match outcome {
            AttemptOutcome::Won if attempt.dry_run => {
                info!(
                    "Node {} dry election run succeeded, running for election in term {}",
                    self.node_id,
                    attempt.term + 1
                );
                info!("Node {} Starting an election for {}", self.node_id, attempt.reason);
                self.start_real_election(attempt.reason);
            }
            AttemptOutcome::Won => {
                info!(
                    "Node {} election succeeded, assuming primary role in term {}",
                    self.node_id, attempt.term
                );
                self.assume_primary_role(attempt.term);
            }
            AttemptOutcome::Lost => {
                let causes = requester.errors().to_vec();
                let text = if attempt.dry_run {
                    "not running for primary, we received insufficient votes"
                } else {
                    "not becoming primary, we received insufficient votes"
                };
                if let Err(err) =
                    new_multiple_err::<()>(ErrorKind::InsufficientVotes, text.to_string(), causes)
                {
                    info!("Node {} {} in term {}", self.node_id, err, attempt.term);
                }
                self.fall_back_to_follower();
            }
            AttemptOutcome::Superseded(term) => {
                if attempt.dry_run {
                    info!(
                        "Node {} not running for primary, we have been superseded already \
                         (term {} observed)",
                        self.node_id, term
                    );
                } else {
                    info!(
                        "Node {} not becoming primary, we have been superseded already \
                         (term {} observed)",
                        self.node_id, term
                    );
                }
                self.fall_back_to_follower();
                self.discover_term(term);
            }
            AttemptOutcome::Cancelled => {}
        }
    }

    fn assume_primary_role(&mut self, term: Term) {
        if let Err(err) = self.roles.become_leader() {
            warn!("Node {} {}", self.node_id, err);
            return;
        }

        self.leader_id = Some(self.node_id);
        self.election_timeout.cancel();
        self.takeover.cancel();

        let deadline = self.clock.now() + self.config.settings.catch_up_timeout;
        let peers = self.config.voting_peers(self.node_id);
        let controller = CatchUpController::start(term, peers.clone(), deadline);
        if !peers.is_empty() {
            self.commands.push(CoordinatorCommand::ScanFreshness {
                term,
                peers,
                cancellation: controller.cancellation().clone(),
            });
        }
        self.catch_up = Some(controller);

        self.poll_catch_up();
    }

    fn poll_catch_up(&mut self) {
        let now = self.clock.now();
        let last_applied = self.last_applied;
        let outcome = match self.catch_up.as_mut() {
            Some(controller) => controller.poll(last_applied, now),
            None => return,
        };
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => return,
        };
        let mut controller = match self.catch_up.take() {
            Some(controller) => controller,
            None => return,
        };

        match outcome {
            CatchUpOutcome::SkippedMostUpToDate => info!(
                "Node {} My position is most up-to-date, skipping catch-up",
                self.node_id
            ),
            CatchUpOutcome::Finished => info!(
                "Node {} Finished catch-up after becoming primary at {}",
                self.node_id, last_applied
            ),
            CatchUpOutcome::TimedOut => warn!(
                "Node {} Cannot catch up after becoming primary: reached {} of target {:?}",
                self.node_id,
                last_applied,
                controller.target()
            ),
            CatchUpOutcome::Unreachable => {
                let causes = controller.take_errors();
                if let Err(err) = new_multiple_err::<()>(
                    ErrorKind::Timeout,
                    "Could not access any nodes within timeout".to_string(),
                    causes,
                ) {
                    warn!("Node {} {}", self.node_id, err);
                }
            }
        }

        self.enter_drain_mode(controller.term());
    }

    fn enter_drain_mode(&mut self, term: Term) {
        if let Err(err) = self.roles.enter_draining() {
            warn!("Node {} {}", self.node_id, err);
            return;
        }

        info!("Node {} entering drain mode for term {}", self.node_id, term);
        self.commands
            .push(CoordinatorCommand::DrainModeEntered { term });
    }

    fn discover_term(&mut self, term: Term) {
        if let Err(err) = self.update_term(term) {
            error!(
                "Node {} cannot adopt term {}: {}",
                self.node_id, term, err
            );
        }
    }

    fn on_term_advanced(&mut self, term: Term) {
        info!("Node {} adopted term {}", self.node_id, term);

        self.leader_id = None;
        self.takeover.cancel();
        if let Some(mut requester) = self.vote_requester.take() {
            requester.cancel();
            if requester.attempt().dry_run {
                info!(
                    "Node {} not running for primary, we have been superseded already",
                    self.node_id
                );
            } else {
                info!(
                    "Node {} not becoming primary, we have been superseded already",
                    self.node_id
                );
            }
        }
        self.stop_transition_to_primary();
        if let Some(previous) = self.roles.step_down() {
            info!(
                "Node {} stepped down from {} after term {} was adopted",
                self.node_id, previous, term
            );
        }

        self.arm_election_timer();
    }

    fn stop_transition_to_primary(&mut self) {
        if let Some(controller) = self.catch_up.take() {
            controller.cancel();
            info!(
                "Node {} Stopped transition to primary of term {}",
                self.node_id,
                controller.term()
            );
        }
    }

    /// Cancels the vote fan-out in flight and returns a candidate to Follower.
    fn cancel_election(&mut self, cause: &str) {
        if let Some(mut requester) = self.vote_requester.take() {
            requester.cancel();
            let err = RaftError::new(
                ErrorKind::Cancelled,
                format!("election attempt {} stopped: {}", requester.attempt().id, cause),
            );
            info!("Node {} {}", self.node_id, err);
        }

        if let Role::Candidate { .. } = self.roles.role() {
            self.fall_back_to_follower();
        }
    }

    fn fall_back_to_follower(&mut self) {
        self.roles.step_down();
        self.arm_election_timer();
    }

    fn arm_election_timer(&mut self) {
        if !self.roles.is_follower() || !self.config.is_electable(self.node_id) {
            self.election_timeout.cancel();
            return;
        }

        let settings = self.config.settings;
        let deadline = self.election_timeout.arm(
            self.clock.now(),
            settings.election_timeout,
            settings.election_timeout_offset_fraction,
        );
        trace!("Node {} election timeout armed for {:?}", self.node_id, deadline);
    }
}
