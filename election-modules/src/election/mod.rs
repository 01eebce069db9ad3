pub mod fixed_election_timer;
