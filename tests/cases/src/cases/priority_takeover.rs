use crate::steps;
use crate::steps::cluster::start_initial_cluster;
use raft::{MemberConfiguration, Role};
use std::time::Duration;

pub fn run() {
    info!("Priority takeover case: a higher-priority node replaces the elected primary");

    let configuration = steps::cluster_configuration(vec![
        MemberConfiguration::with_priority(1, 1),
        MemberConfiguration::with_priority(2, 2),
        MemberConfiguration::with_priority(3, 1),
    ]);
    let cluster = start_initial_cluster(configuration, steps::create_node_leader_first);

    let first_leader = cluster.wait_for_writable_leader(Duration::from_secs(5));
    assert_eq!(Some(1), first_leader);
    let first_term = cluster.handle(1).current_term();

    let taken_over = steps::wait_for(Duration::from_secs(5), || {
        cluster.writable_leader() == Some(2)
    });
    assert!(taken_over, "Node 2 did not take over");
    assert!(cluster.handle(2).current_term() > first_term);

    let stepped_down = steps::wait_for(Duration::from_secs(2), || {
        let status = cluster.handle(1).status();
        status.role == Role::Follower && status.leader_id == Some(2)
    });
    assert!(stepped_down, "Node 1 did not follow the new primary");
    cluster.assert_single_leader_per_term();

    // The most electable node keeps the office.
    steps::sleep(2);
    assert_eq!(Some(2), cluster.writable_leader());
    assert_eq!(None, cluster.handle(1).priority_takeover_deadline());
    assert_eq!(None, cluster.handle(3).priority_takeover_deadline());

    cluster.terminate();
    info!("Priority takeover case passed");
}
