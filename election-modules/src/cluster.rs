use parking_lot::Mutex;
use raft::{Cluster, ClusterConfiguration, NodeId};
use std::sync::Arc;

/// Cluster configuration shared by every node of an in-process cluster. Newer versions reported
/// by the nodes are recorded for inspection.
#[derive(Clone, Debug)]
pub struct SharedClusterConfiguration {
    configuration: Arc<Mutex<ClusterConfiguration>>,
    reported_versions: Arc<Mutex<Vec<(NodeId, u64)>>>,
}

impl SharedClusterConfiguration {
    pub fn new(configuration: ClusterConfiguration) -> SharedClusterConfiguration {
        SharedClusterConfiguration {
            configuration: Arc::new(Mutex::new(configuration)),
            reported_versions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the configuration. Nodes pick it up through their handles.
    pub fn set_configuration(&self, configuration: ClusterConfiguration) {
        *self.configuration.lock() = configuration;
    }

    pub fn reported_versions(&self) -> Vec<(NodeId, u64)> {
        self.reported_versions.lock().clone()
    }
}

impl Cluster for SharedClusterConfiguration {
    fn configuration(&self) -> ClusterConfiguration {
        self.configuration.lock().clone()
    }

    fn report_newer_configuration(&self, from: NodeId, version: u64) {
        let current_version = self.configuration.lock().version;
        if version > current_version {
            info!(
                "Node {} runs config version {}, the shared one is {}",
                from, version, current_version
            );
        }
        self.reported_versions.lock().push((from, version));
    }
}
