pub mod leader_partition;
pub mod no_quorum;
pub mod priority_takeover;
pub mod single_node;
pub mod smoke;
