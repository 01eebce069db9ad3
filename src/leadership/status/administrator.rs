use crossbeam_channel::{Receiver, Sender};

use crate::leadership::status::ElectionEvent;

/// Both ends of the election event channel. Every producer clones the sender; the election
/// worker is the only consumer.
#[derive(Debug, Clone)]
pub struct ElectionAdministrator {
    election_event_tx: Sender<ElectionEvent>,
    election_event_rx: Receiver<ElectionEvent>,
}

impl ElectionAdministrator {
    pub fn new() -> ElectionAdministrator {
        let (election_event_tx, election_event_rx): (
            Sender<ElectionEvent>,
            Receiver<ElectionEvent>,
        ) = crossbeam_channel::unbounded();

        ElectionAdministrator {
            election_event_tx,
            election_event_rx,
        }
    }

    pub fn election_event_tx(&self) -> Sender<ElectionEvent> {
        self.election_event_tx.clone()
    }

    pub fn election_event_rx(&self) -> &Receiver<ElectionEvent> {
        &self.election_event_rx
    }
}

impl Default for ElectionAdministrator {
    fn default() -> Self {
        ElectionAdministrator::new()
    }
}
