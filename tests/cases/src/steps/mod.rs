use election_modules::{
    FixedElectionTimer, InProcNetwork, MemoryLogApplier, MemoryNodeStateStore,
    SharedClusterConfiguration,
};
use raft::{
    ClusterConfiguration, ElectionSettings, ElectionTimer, FreshnessWindow, MemberConfiguration,
    NodeConfiguration, NodeId, NodeLimits, Position, RandomizedElectionTimer, SystemClock,
};
use std::thread;
use std::time::{Duration, Instant};

pub mod cluster;

use cluster::CaseNode;

pub fn sleep(seconds: u64) {
    thread::sleep(Duration::from_secs(seconds));
}

pub fn sleep_ms(millis: u64) {
    thread::sleep(Duration::from_millis(millis));
}

pub fn get_election_settings() -> ElectionSettings {
    ElectionSettings {
        election_timeout: Duration::from_millis(500),
        election_timeout_offset_fraction: 0.15,
        heartbeat_interval: Duration::from_millis(100),
        catch_up_timeout: Duration::from_millis(300),
        priority_takeover_delay_step: Duration::from_millis(250),
        freshness_window: FreshnessWindow::default(),
    }
}

pub fn get_node_limits() -> NodeLimits {
    NodeLimits {
        handle_request_timeout: Duration::from_millis(500),
        idle_poll_interval: Duration::from_millis(50),
    }
}

pub fn cluster_configuration(members: Vec<MemberConfiguration>) -> ClusterConfiguration {
    let mut configuration = ClusterConfiguration::new(1, members);
    configuration.settings = get_election_settings();

    configuration
}

pub fn equal_members(node_ids: &[NodeId]) -> Vec<MemberConfiguration> {
    node_ids.iter().copied().map(MemberConfiguration::new).collect()
}

/// Node 1 times out first, the rest of the nodes wait for the largest offset allowed.
pub fn create_node_leader_first(
    node_id: NodeId,
    cluster: SharedClusterConfiguration,
    network: &InProcNetwork,
) -> CaseNode {
    if node_id == 1 {
        return create_node(node_id, cluster, network, FixedElectionTimer::new(0));
    }

    create_node(node_id, cluster, network, FixedElectionTimer::new(u64::MAX))
}

pub fn create_node_randomized(
    node_id: NodeId,
    cluster: SharedClusterConfiguration,
    network: &InProcNetwork,
) -> CaseNode {
    create_node(node_id, cluster, network, RandomizedElectionTimer::new())
}

pub fn create_node<Et: ElectionTimer>(
    node_id: NodeId,
    cluster: SharedClusterConfiguration,
    network: &InProcNetwork,
    election_timer: Et,
) -> CaseNode {
    let log_applier = MemoryLogApplier::new();

    let config = NodeConfiguration {
        node_id,
        last_applied: Position::default(),
        last_durable: Position::default(),
        cluster,
        peer_communicator: network.communicator(node_id),
        election_timer,
        state_store: MemoryNodeStateStore::new(),
        log_applier: log_applier.clone(),
        clock: SystemClock,
        limits: get_node_limits(),
    };

    let (worker, handle) = raft::start_node(config).expect("node started");
    network.register(handle.clone());
    log_applier.attach(handle.clone());

    CaseNode {
        id: node_id,
        worker,
        handle,
        log_applier,
    }
}

/// Polls the condition until it holds or the timeout elapses.
pub fn wait_for<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep_ms(20);
    }
}
