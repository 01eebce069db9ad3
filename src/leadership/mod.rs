pub mod election_timer;
pub mod heartbeat;
pub mod priority_takeover;
pub mod status;
pub mod term;
pub mod vote_ledger;
pub mod vote_request_processor;
pub mod vote_requester;
