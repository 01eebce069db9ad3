pub mod command_dispatcher;
pub mod election_worker;
pub mod heartbeat_poller;
