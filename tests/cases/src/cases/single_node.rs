use crate::steps;
use crate::steps::cluster::start_initial_cluster;
use raft::Role;
use std::time::Duration;

pub fn run() {
    info!("Single node case: the only voter elects itself without waiting for the timeout");

    let configuration = steps::cluster_configuration(steps::equal_members(&[1]));
    let cluster = start_initial_cluster(configuration, steps::create_node_randomized);

    // Well below the election timeout.
    let leader = cluster.wait_for_writable_leader(Duration::from_millis(300));
    assert_eq!(Some(1), leader);

    let status = cluster.handle(1).status();
    assert_eq!(1, status.term);
    assert!(status.role.is_leader());

    cluster
        .handle(1)
        .request_step_down()
        .expect("step-down accepted");
    let stepped_down = steps::wait_for(Duration::from_millis(500), || {
        cluster.handle(1).current_role() == Role::Follower
    });
    assert!(stepped_down);

    // Nobody else can win, so the node runs for office again.
    let leader = cluster.wait_for_writable_leader(Duration::from_secs(2));
    assert_eq!(Some(1), leader);
    assert!(cluster.handle(1).current_term() >= 2);

    cluster.terminate();
    info!("Single node case passed");
}
