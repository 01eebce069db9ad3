use crate::steps;
use crate::steps::cluster::start_initial_cluster;
use raft::Role;

pub fn run() {
    info!("No quorum case: an isolated majority-less node never raises its term");

    let configuration = steps::cluster_configuration(steps::equal_members(&[1, 2, 3]));
    let cluster = start_initial_cluster(configuration, steps::create_node_randomized);
    cluster.network.isolate(1);
    cluster.network.isolate(2);
    cluster.network.isolate(3);

    steps::sleep(3);

    assert_eq!(None, cluster.writable_leader());
    for status in cluster.statuses() {
        assert_eq!(0, status.term, "dry runs must not advance terms");
        assert_ne!(Role::Candidate { dry_run: false }, status.role);
    }

    cluster.network.reconnect(1);
    cluster.network.reconnect(2);
    cluster.network.reconnect(3);

    let leader = cluster.wait_for_writable_leader(std::time::Duration::from_secs(5));
    assert!(leader.is_some());
    cluster.assert_single_leader_per_term();

    cluster.terminate();
    info!("No quorum case passed");
}
