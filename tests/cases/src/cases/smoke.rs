use crate::steps;
use crate::steps::cluster::start_initial_cluster;
use std::time::Duration;

pub fn run() {
    info!("Smoke case: three nodes elect a writable primary");

    let configuration = steps::cluster_configuration(steps::equal_members(&[1, 2, 3]));
    let cluster = start_initial_cluster(configuration, steps::create_node_leader_first);

    let leader = cluster.wait_for_writable_leader(Duration::from_secs(5));
    assert_eq!(Some(1), leader);
    cluster.assert_single_leader_per_term();

    let leader_term = cluster.handle(1).current_term();
    assert!(leader_term >= 1);

    let followers_agree = steps::wait_for(Duration::from_secs(2), || {
        cluster.statuses().iter().all(|status| {
            status.term == leader_term && status.leader_id == Some(1)
        })
    });
    assert!(followers_agree, "followers did not discover the primary");

    // Heartbeats keep the followers from starting elections.
    steps::sleep(2);
    assert_eq!(Some(1), cluster.writable_leader());
    assert_eq!(leader_term, cluster.handle(2).current_term());

    let drained = cluster.nodes[0].log_applier.drained_terms();
    assert_eq!(vec![leader_term], drained);

    cluster.terminate();
    info!("Smoke case passed");
}
