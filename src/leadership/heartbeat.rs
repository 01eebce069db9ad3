use std::collections::HashMap;
use std::time::Instant;

use crate::common::{NodeId, Term};
use crate::communication::peers::{HeartbeatResponse, ReportedRole};
use crate::operation_log::Position;

/// Last known state of a peer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PeerView {
    pub id: NodeId,
    pub role: ReportedRole,
    pub term: Term,
    pub applied: Position,
    pub durable: Position,
    pub config_version: u64,
    pub up: bool,
    pub last_heartbeat_at: Option<Instant>,
}

impl PeerView {
    fn new(id: NodeId) -> PeerView {
        PeerView {
            id,
            role: ReportedRole::Secondary,
            term: 0,
            applied: Position::default(),
            durable: Position::default(),
            config_version: 0,
            up: false,
            last_heartbeat_at: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HeartbeatTracker {
    views: HashMap<NodeId, PeerView>,
}

impl HeartbeatTracker {
    pub fn new(peers: &[NodeId]) -> HeartbeatTracker {
        let mut tracker = HeartbeatTracker::default();
        tracker.set_members(peers);
        tracker
    }

    /// Keeps views of retained peers, creates views for new ones and forgets removed ones.
    pub fn set_members(&mut self, peers: &[NodeId]) {
        self.views.retain(|id, _| peers.contains(id));
        for peer_id in peers {
            self.views
                .entry(*peer_id)
                .or_insert_with(|| PeerView::new(*peer_id));
        }
    }

    /// Records a reply. Replies from peers outside the configuration are ignored.
    pub fn on_response(&mut self, response: &HeartbeatResponse, now: Instant) -> Option<PeerView> {
        let view = self.views.get_mut(&response.peer_id)?;

        view.role = response.role;
        view.term = response.term;
        view.applied = response.applied;
        view.durable = response.durable;
        view.config_version = response.config_version;
        view.up = true;
        view.last_heartbeat_at = Some(now);

        Some(*view)
    }

    pub fn on_failure(&mut self, peer_id: NodeId) {
        if let Some(view) = self.views.get_mut(&peer_id) {
            if view.up {
                debug!("Node {} marked down after a failed heartbeat", peer_id);
            }
            view.up = false;
        }
    }

    pub fn peer_view(&self, peer_id: NodeId) -> Option<&PeerView> {
        self.views.get(&peer_id)
    }

    pub fn most_advanced_applied(&self) -> Option<Position> {
        self.views
            .values()
            .filter(|view| view.up)
            .map(|view| view.applied)
            .max()
    }

    /// Up peer claiming to be primary, highest term first.
    pub fn current_primary(&self) -> Option<&PeerView> {
        self.views
            .values()
            .filter(|view| view.up && view.role == ReportedRole::Primary)
            .max_by_key(|view| view.term)
    }
}
