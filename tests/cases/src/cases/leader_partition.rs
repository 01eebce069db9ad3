use crate::steps;
use crate::steps::cluster::start_initial_cluster;
use raft::{NodeId, Role};
use std::time::Duration;

pub fn run() {
    info!("Leader partition case: the majority elects a new primary, the old one steps down");

    let configuration = steps::cluster_configuration(steps::equal_members(&[1, 2, 3]));
    let cluster = start_initial_cluster(configuration, steps::create_node_leader_first);

    let leader = cluster.wait_for_writable_leader(Duration::from_secs(5));
    assert_eq!(Some(1), leader);
    let old_term = cluster.handle(1).current_term();

    cluster.network.isolate(1);

    let majority_leader = || -> Option<NodeId> {
        cluster
            .statuses()
            .into_iter()
            .filter(|status| status.node_id != 1 && status.can_accept_writes)
            .map(|status| status.node_id)
            .next()
    };
    let elected = steps::wait_for(Duration::from_secs(5), || majority_leader().is_some());
    assert!(elected, "the majority did not elect a primary");

    let new_leader = majority_leader().expect("new primary");
    let new_term = cluster.handle(new_leader).current_term();
    assert!(new_term > old_term);
    cluster.assert_single_leader_per_term();

    cluster.network.reconnect(1);

    let stepped_down = steps::wait_for(Duration::from_secs(3), || {
        let status = cluster.handle(1).status();
        status.role == Role::Follower && status.term >= new_term
    });
    assert!(stepped_down, "the old primary kept its role");
    assert_eq!(Some(new_leader), cluster.wait_for_writable_leader(Duration::from_secs(2)));

    cluster.terminate();
    info!("Leader partition case passed");
}
