pub mod cluster;
pub mod node;
